//! Internal type representation used during inference.
//!
//! This is deliberately distinct from `thrush_parser::ast::Type`: that type
//! only ever *names* variables (for parsed annotations and decorated AST
//! slots); this one carries a unification-table identity (`TyVar`) so `ena`
//! can union variables and bind them to concrete types.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thrush_parser::ast::{Effect, Primitive};

/// A type variable: an index into the `InferCtx`'s unification table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TyVar(pub u32);

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}

/// A field in a record type, ordered for deterministic display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordField {
    pub name: String,
    pub ty: Ty,
}

/// The internal type lattice. Mirrors the tagged variants of
/// `thrush_parser::ast::Type`, plus a unification variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Ty {
    Var(TyVar),
    Primitive(Primitive),
    Function {
        params: Vec<Ty>,
        result: Box<Ty>,
        effects: HashSet<Effect>,
    },
    List(Box<Ty>),
    Tuple(Vec<Ty>),
    Record(Vec<RecordField>),
    Union(Vec<Ty>),
    Variant {
        name: String,
        args: Vec<Ty>,
    },
    Unit,
    Unknown,
}

impl Ty {
    pub fn function(params: Vec<Ty>, result: Ty) -> Ty {
        Ty::Function {
            params,
            result: Box::new(result),
            effects: HashSet::new(),
        }
    }

    pub fn float() -> Ty {
        Ty::Primitive(Primitive::Float)
    }

    pub fn string() -> Ty {
        Ty::Primitive(Primitive::String)
    }

    pub fn bool() -> Ty {
        Ty::Primitive(Primitive::Bool)
    }
}

/// One of a fixed sequence of greek letters used only for display; a
/// variable's real identity is its `TyVar` index.
pub fn greek_name(index: u32) -> String {
    const LETTERS: &[char] = &[
        'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ', 'σ',
        'τ', 'υ', 'φ', 'χ', 'ψ', 'ω',
    ];
    let letter = LETTERS[(index as usize) % LETTERS.len()];
    let cycle = index as usize / LETTERS.len();
    if cycle == 0 {
        letter.to_string()
    } else {
        format!("{letter}{cycle}")
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => write!(f, "{}", greek_name(v.0)),
            Ty::Primitive(p) => write!(f, "{p:?}"),
            Ty::Function { params, result, effects } => {
                for p in params {
                    write!(f, "{p} -> ")?;
                }
                write!(f, "{result}")?;
                let mut sorted: Vec<_> = effects.iter().collect();
                sorted.sort_by_key(|e| e.name());
                for e in sorted {
                    write!(f, " !{}", e.name())?;
                }
                Ok(())
            }
            Ty::List(elem) => write!(f, "List {elem}"),
            Ty::Tuple(elems) => {
                write!(f, "{{")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "}}")
            }
            Ty::Record(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "@{} {}", field.name, field.ty)?;
                }
                write!(f, "}}")
            }
            Ty::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{m}")?;
                }
                Ok(())
            }
            Ty::Variant { name, args } => {
                write!(f, "{name}")?;
                for a in args {
                    write!(f, " {a}")?;
                }
                Ok(())
            }
            Ty::Unit => write!(f, "Unit"),
            Ty::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A polymorphic type scheme: `forall vars. ty`.
#[derive(Clone, Debug, PartialEq)]
pub struct Scheme {
    pub vars: Vec<TyVar>,
    pub ty: Ty,
}

impl Scheme {
    pub fn mono(ty: Ty) -> Scheme {
        Scheme { vars: Vec::new(), ty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greek_name_cycles_after_exhausting_letters() {
        assert_eq!(greek_name(0), "α");
        assert_eq!(greek_name(24), "α1");
    }

    #[test]
    fn display_function_with_effects() {
        let ty = Ty::Function {
            params: vec![Ty::float()],
            result: Box::new(Ty::Unit),
            effects: HashSet::from([Effect::Log]),
        };
        assert_eq!(ty.to_string(), "Float -> Unit !log");
    }
}
