//! The public type representation: what type expressions parse into, and
//! what the type engine writes into a decorated AST node's `type` slot.
//!
//! This is deliberately simpler than the type engine's internal
//! representation (`thrush_typeck::ty::Ty`), which adds unification
//! variables with a monotonic identity. `Type` only ever names variables,
//! never unifies them -- conversion between the two lives in `thrush-typeck`.

use serde::{Deserialize, Serialize};

/// One of the fixed side-effect tags a function type may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Effect {
    Log,
    Read,
    Write,
    State,
    Time,
    Rand,
    Ffi,
    Async,
}

impl Effect {
    pub fn from_name(name: &str) -> Option<Effect> {
        Some(match name {
            "log" => Effect::Log,
            "read" => Effect::Read,
            "write" => Effect::Write,
            "state" => Effect::State,
            "time" => Effect::Time,
            "rand" => Effect::Rand,
            "ffi" => Effect::Ffi,
            "async" => Effect::Async,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Effect::Log => "log",
            Effect::Read => "read",
            Effect::Write => "write",
            Effect::State => "state",
            Effect::Time => "time",
            Effect::Rand => "rand",
            Effect::Ffi => "ffi",
            Effect::Async => "async",
        }
    }
}

/// A fixed primitive name. `Number` the surface keyword and `Float` the
/// literal-inference result are the same primitive -- see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Float,
    String,
    Bool,
    Int,
    Unit,
}

/// A named field in a record type or record/constraint value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordTypeField {
    pub name: String,
    pub ty: Type,
}

/// The public, name-based type representation (spec's Types tagged variants).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Primitive(Primitive),
    /// A type variable, optionally carrying constraints accumulated on it.
    Variable {
        name: String,
        constraints: Option<Vec<Constraint>>,
    },
    Function {
        params: Vec<Type>,
        result: Box<Type>,
        effects: Vec<Effect>,
        constraints: Option<Vec<Constraint>>,
    },
    List(Box<Type>),
    Tuple(Vec<Type>),
    /// Unordered in spec terms; kept as an ordered `Vec` with stable
    /// insertion order so Display output is deterministic.
    Record(Vec<RecordTypeField>),
    Union(Vec<Type>),
    Variant {
        name: String,
        args: Vec<Type>,
    },
    Unit,
    Unknown,
}

impl Type {
    pub fn var(name: impl Into<String>) -> Type {
        Type::Variable {
            name: name.into(),
            constraints: None,
        }
    }

    pub fn function(params: Vec<Type>, result: Type) -> Type {
        Type::Function {
            params,
            result: Box::new(result),
            effects: Vec::new(),
            constraints: None,
        }
    }
}

/// A predicate or shape requirement tracked during inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    Is { type_var: String, name: String },
    HasField { type_var: String, field: String, field_type: Type },
    Implements { type_var: String, interface_name: String },
    HasStructure { type_var: String, structure: Vec<RecordTypeField> },
}

impl Constraint {
    pub fn type_var(&self) -> &str {
        match self {
            Constraint::Is { type_var, .. } => type_var,
            Constraint::HasField { type_var, .. } => type_var,
            Constraint::Implements { type_var, .. } => type_var,
            Constraint::HasStructure { type_var, .. } => type_var,
        }
    }
}

/// The syntactic form a `given` clause parses into, before it is flattened
/// into a `Vec<Constraint>` for solving. The original form is kept for
/// display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintExpr {
    Leaf(Constraint),
    And(Box<ConstraintExpr>, Box<ConstraintExpr>),
    Or(Box<ConstraintExpr>, Box<ConstraintExpr>),
    Paren(Box<ConstraintExpr>),
}

impl ConstraintExpr {
    /// Flatten `and`/`or`/`paren` nodes into the leaf constraints they
    /// contain, in left-to-right order. `or` branches are flattened
    /// conservatively (both sides contribute candidate constraints); the
    /// solver decides satisfiability.
    pub fn flatten(&self) -> Vec<Constraint> {
        match self {
            ConstraintExpr::Leaf(c) => vec![c.clone()],
            ConstraintExpr::And(a, b) | ConstraintExpr::Or(a, b) => {
                let mut out = a.flatten();
                out.extend(b.flatten());
                out
            }
            ConstraintExpr::Paren(inner) => inner.flatten(),
        }
    }
}

/// `(quantifiedVars, type)` -- a polymorphic type scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeScheme {
    pub quantified_vars: Vec<String>,
    pub ty: Type,
}

impl TypeScheme {
    pub fn mono(ty: Type) -> TypeScheme {
        TypeScheme {
            quantified_vars: Vec::new(),
            ty,
        }
    }
}
