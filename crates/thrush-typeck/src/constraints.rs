//! Constraint model: predicates and shape requirements tracked on a type
//! variable during inference (spec §4.4.1 "Constraint merging" and §4.4.3
//! "Built-in constraint predicates").

use thrush_parser::ast::Primitive;

use crate::ty::Ty;

/// A constraint attached to a still-unbound type variable.
#[derive(Clone, Debug, PartialEq)]
pub enum Constraint {
    /// `is(name)`: the variable's eventual type must satisfy a named
    /// built-in predicate (`Number`, `String`, `Show`, ...).
    Is(String),
    /// `hasField(f, Tf)`: the variable's eventual type must be a record
    /// containing field `f` with type `Tf`.
    HasField { field: String, field_type: Ty },
    /// `implements(interfaceName)`: tracked for later resolution, not
    /// enforced structurally during unification.
    Implements(String),
    /// `hasStructure(fields)`: the variable's eventual type must be a
    /// record shaped like `fields`.
    HasStructure(Vec<(String, Ty)>),
}

pub fn constraint_name(c: &Constraint) -> &str {
    match c {
        Constraint::Is(name) => name,
        Constraint::HasField { field, .. } => field,
        Constraint::Implements(name) => name,
        Constraint::HasStructure(_) => "hasStructure",
    }
}

/// The fixed table of built-in predicate names and what they require of a
/// resolved, non-variable type.
pub fn satisfies_is(name: &str, ty: &Ty) -> bool {
    match name {
        "Number" => matches!(ty, Ty::Primitive(Primitive::Int) | Ty::Primitive(Primitive::Float)),
        "String" => matches!(ty, Ty::Primitive(Primitive::String)),
        "Boolean" => matches!(ty, Ty::Primitive(Primitive::Bool)),
        "Show" => matches!(ty, Ty::Primitive(_) | Ty::List(_) | Ty::Record(_)),
        "List" => matches!(ty, Ty::List(_)),
        "Record" => matches!(ty, Ty::Record(_)),
        "Function" => matches!(ty, Ty::Function { .. }),
        "Eq" => matches!(ty, Ty::Primitive(_) | Ty::List(_) | Ty::Record(_)),
        _ => false,
    }
}

/// Whether `name` is one of the fixed predicate names. Unknown constraint
/// names fail at constraint-introduction time, not during discharge.
pub fn is_known_predicate(name: &str) -> bool {
    matches!(
        name,
        "Number" | "String" | "Boolean" | "Show" | "List" | "Record" | "Function" | "Eq"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_predicate_accepts_float() {
        assert!(satisfies_is("Number", &Ty::float()));
    }

    #[test]
    fn number_predicate_rejects_string() {
        assert!(!satisfies_is("Number", &Ty::string()));
    }

    #[test]
    fn unknown_predicate_is_rejected() {
        assert!(!is_known_predicate("Frobnicate"));
    }
}
