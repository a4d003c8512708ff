//! Structured type errors (spec §7's `TypeError` taxonomy) with provenance.

use std::fmt;

use serde::{Deserialize, Serialize};
use thrush_common::Location;

use crate::ty::Ty;

/// Why a particular unification was attempted, for error messages that want
/// to say more than "these two types don't match".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConstraintOrigin {
    FunctionArgument { call_site: Location, param_index: usize },
    BinaryOperator { operator: String, span: Location },
    IfBranches { span: Location },
    Annotation { span: Location },
    Definition { name: String, span: Location },
    Mutation { name: String, span: Location },
    Builtin,
}

impl ConstraintOrigin {
    fn describe(&self) -> String {
        match self {
            ConstraintOrigin::FunctionArgument { param_index, .. } => {
                format!("argument {} of a function application", param_index + 1)
            }
            ConstraintOrigin::BinaryOperator { operator, .. } => {
                format!("operator `{operator}`")
            }
            ConstraintOrigin::IfBranches { .. } => "the branches of an if expression".to_string(),
            ConstraintOrigin::Annotation { .. } => "a type annotation".to_string(),
            ConstraintOrigin::Definition { name, .. } => format!("the definition of `{name}`"),
            ConstraintOrigin::Mutation { name, .. } => format!("the mutation of `{name}`"),
            ConstraintOrigin::Builtin => "a built-in operation".to_string(),
        }
    }

    pub fn location(&self) -> Location {
        match self {
            ConstraintOrigin::FunctionArgument { call_site, .. } => *call_site,
            ConstraintOrigin::BinaryOperator { span, .. } => *span,
            ConstraintOrigin::IfBranches { span } => *span,
            ConstraintOrigin::Annotation { span } => *span,
            ConstraintOrigin::Definition { span, .. } => *span,
            ConstraintOrigin::Mutation { span, .. } => *span,
            ConstraintOrigin::Builtin => Location::synthetic(),
        }
    }
}

/// One of the fixed kinds from the taxonomy, each carrying whatever detail
/// it needs to render a useful message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TypeError {
    Unification { expected: Ty, found: Ty, origin: ConstraintOrigin },
    OccursCheck { var: Ty, ty: Ty, origin: ConstraintOrigin },
    UndefinedVariable { name: String, location: Location },
    NonFunctionApplication { ty: Ty, location: Location },
    FunctionApplicationArityOrMismatch { expected: usize, found: usize, location: Location },
    OperatorType { operator: String, location: Location },
    ConditionNotBool { found: Ty, location: Location },
    IfBranchMismatch { then_ty: Ty, else_ty: Ty, location: Location },
    ListElementMismatch { expected: Ty, found: Ty, location: Location },
    TypeAnnotationMismatch { annotated: Ty, inferred: Ty, location: Location },
    PipelineComposition { found: Ty, location: Location },
    MutationTypeMismatch { name: String, expected: Ty, found: Ty, location: Location },
    TupleLengthMismatch { expected: usize, found: usize, location: Location },
    RecordMissingField { field: String, location: Location },
    UnionMismatch { location: Location },
    VariantNameOrArity { expected_name: String, found_name: String, location: Location },
    ConstraintNotSatisfied { constraint: String, ty: Ty, location: Location },
    UnknownConstraint { name: String, location: Location },
    UnknownConstructor { name: String, location: Location },
    ConstructorArity { name: String, expected: usize, found: usize, location: Location },
    DuplicateTypeParam { name: String, location: Location },
    EffectInvalid { name: String, location: Location },
}

impl TypeError {
    pub fn location(&self) -> Location {
        match self {
            TypeError::Unification { origin, .. } => origin.location(),
            TypeError::OccursCheck { origin, .. } => origin.location(),
            TypeError::UndefinedVariable { location, .. }
            | TypeError::NonFunctionApplication { location, .. }
            | TypeError::FunctionApplicationArityOrMismatch { location, .. }
            | TypeError::OperatorType { location, .. }
            | TypeError::ConditionNotBool { location, .. }
            | TypeError::IfBranchMismatch { location, .. }
            | TypeError::ListElementMismatch { location, .. }
            | TypeError::TypeAnnotationMismatch { location, .. }
            | TypeError::PipelineComposition { location, .. }
            | TypeError::MutationTypeMismatch { location, .. }
            | TypeError::TupleLengthMismatch { location, .. }
            | TypeError::RecordMissingField { location, .. }
            | TypeError::UnionMismatch { location }
            | TypeError::VariantNameOrArity { location, .. }
            | TypeError::ConstraintNotSatisfied { location, .. }
            | TypeError::UnknownConstraint { location, .. }
            | TypeError::UnknownConstructor { location, .. }
            | TypeError::ConstructorArity { location, .. }
            | TypeError::DuplicateTypeParam { location, .. }
            | TypeError::EffectInvalid { location, .. } => *location,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::Unification { expected, found, origin } => write!(
                f,
                "type mismatch in {}: expected `{expected}`, found `{found}`",
                origin.describe()
            ),
            TypeError::OccursCheck { var, ty, .. } => {
                write!(f, "infinite type: `{var}` occurs in `{ty}`")
            }
            TypeError::UndefinedVariable { name, .. } => write!(f, "undefined variable `{name}`"),
            TypeError::NonFunctionApplication { ty, .. } => {
                write!(f, "cannot apply a value of type `{ty}`")
            }
            TypeError::FunctionApplicationArityOrMismatch { expected, found, .. } => write!(
                f,
                "function expects {expected} argument(s), found {found}"
            ),
            TypeError::OperatorType { operator, .. } => {
                write!(f, "invalid operand types for operator `{operator}`")
            }
            TypeError::ConditionNotBool { found, .. } => {
                write!(f, "if condition must be `Bool`, found `{found}`")
            }
            TypeError::IfBranchMismatch { then_ty, else_ty, .. } => write!(
                f,
                "if branches disagree: then has `{then_ty}`, else has `{else_ty}`"
            ),
            TypeError::ListElementMismatch { expected, found, .. } => write!(
                f,
                "list element type mismatch: expected `{expected}`, found `{found}`"
            ),
            TypeError::TypeAnnotationMismatch { annotated, inferred, .. } => write!(
                f,
                "annotation `{annotated}` does not match inferred type `{inferred}`"
            ),
            TypeError::PipelineComposition { found, .. } => write!(
                f,
                "pipeline step expects a one-parameter function, found `{found}`"
            ),
            TypeError::MutationTypeMismatch { name, expected, found, .. } => write!(
                f,
                "cannot mutate `{name}`: expected `{expected}`, found `{found}`"
            ),
            TypeError::TupleLengthMismatch { expected, found, .. } => write!(
                f,
                "tuple length mismatch: expected {expected}, found {found}"
            ),
            TypeError::RecordMissingField { field, .. } => {
                write!(f, "record is missing field `{field}`")
            }
            TypeError::UnionMismatch { .. } => write!(f, "union member types do not line up"),
            TypeError::VariantNameOrArity { expected_name, found_name, .. } => write!(
                f,
                "variant mismatch: expected `{expected_name}`, found `{found_name}`"
            ),
            TypeError::ConstraintNotSatisfied { constraint, ty, .. } => write!(
                f,
                "type `{ty}` does not satisfy constraint `{constraint}`"
            ),
            TypeError::UnknownConstraint { name, .. } => {
                write!(f, "unknown constraint `{name}`")
            }
            TypeError::UnknownConstructor { name, .. } => {
                write!(f, "unknown constructor `{name}`")
            }
            TypeError::ConstructorArity { name, expected, found, .. } => write!(
                f,
                "constructor `{name}` expects {expected} argument(s), found {found}"
            ),
            TypeError::DuplicateTypeParam { name, .. } => {
                write!(f, "duplicate type parameter `{name}`")
            }
            TypeError::EffectInvalid { name, .. } => write!(f, "unknown effect `{name}`"),
        }
    }
}

impl std::error::Error for TypeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_error_round_trips_through_json() {
        let err = TypeError::UndefinedVariable {
            name: "doesNotExist".to_string(),
            location: Location::synthetic(),
        };
        let json = serde_json::to_string(&err).expect("TypeError should serialize");
        let back: TypeError = serde_json::from_str(&json).expect("TypeError should deserialize");
        assert_eq!(err, back);
    }
}
