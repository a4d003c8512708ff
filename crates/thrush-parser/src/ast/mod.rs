pub mod expr;
pub mod pat;
pub mod ty;

pub use expr::{
    Expression, ExprKind, ImplementationBinding, Literal, MatchCase, MethodSignature, Program,
    RecordField, UserTypeBody, VariantConstructor,
};
pub use pat::{Pattern, PatternKind};
pub use ty::{Constraint, ConstraintExpr, Effect, Primitive, RecordTypeField, Type, TypeScheme};
