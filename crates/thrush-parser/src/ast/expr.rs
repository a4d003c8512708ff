//! Expression nodes: the single closed sum type every production in the
//! grammar builds. Every variant is a `statement` in the sense of §3.2 of
//! the surface language -- plain expressions, definitions, declarations,
//! and imports all live in the one tag set so a `Program` is just a tree of
//! `Expression`.

use serde::{Deserialize, Serialize};
use thrush_common::Location;

use super::pat::Pattern;
use super::ty::{ConstraintExpr, Type};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordField {
    pub name: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub body: Expression,
}

/// One constructor in a `variant Name params = Ctor args | ...` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantConstructor {
    pub name: String,
    pub args: Vec<Type>,
}

/// The right-hand side of a `type Name params = ...` declaration: a record,
/// tuple, or union shape built from the type-expression grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UserTypeBody {
    Record(Vec<(String, Type)>),
    Tuple(Vec<Type>),
    Union(Vec<Type>),
}

/// One method signature inside a `constraint Name a ( ... )` declaration:
/// `name typeParams : TypeExpr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub type_params: Vec<String>,
    pub ty: Type,
}

/// One `name = expr` binding inside an `implement Name TypeName ( ... )`
/// block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationBinding {
    pub name: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub location: Location,
    pub ty: Option<Type>,
    pub kind: Box<ExprKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    Variable(String),
    Function {
        params: Vec<String>,
        body: Expression,
    },
    Application {
        func: Expression,
        args: Vec<Expression>,
    },
    Binary {
        operator: String,
        left: Expression,
        right: Expression,
    },
    Pipeline {
        steps: Vec<Expression>,
    },
    If {
        condition: Expression,
        then_branch: Expression,
        else_branch: Expression,
    },
    List(Vec<Expression>),
    Tuple(Vec<Expression>),
    Record(Vec<RecordField>),
    Accessor {
        field: String,
        optional: bool,
    },
    Unit,
    Definition {
        name: String,
        value: Expression,
    },
    MutableDefinition {
        name: String,
        value: Expression,
    },
    Mutation {
        name: String,
        value: Expression,
    },
    Import {
        path: String,
    },
    Where {
        definitions: Vec<Expression>,
        main: Expression,
    },
    Typed {
        expr: Expression,
        ty: Type,
    },
    Constrained {
        expr: Expression,
        ty: Type,
        constraint: ConstraintExpr,
    },
    TypeDefinition {
        name: String,
        type_params: Vec<String>,
        constructors: Vec<VariantConstructor>,
    },
    UserDefinedType {
        name: String,
        params: Vec<String>,
        body: UserTypeBody,
    },
    Match {
        scrutinee: Expression,
        cases: Vec<MatchCase>,
    },
    ConstraintDefinition {
        name: String,
        type_param: String,
        signatures: Vec<MethodSignature>,
    },
    ImplementDefinition {
        constraint_name: String,
        type_name: String,
        implementations: Vec<ImplementationBinding>,
    },
}

impl Expression {
    pub fn new(location: Location, kind: ExprKind) -> Expression {
        Expression {
            location,
            ty: None,
            kind: Box::new(kind),
        }
    }
}

/// A full program: spec §4.3 represents the statement sequence as a
/// left-associative `binary(';', ...)` chain, so a `Program` is a thin
/// wrapper around that single root expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub expression: Expression,
}
