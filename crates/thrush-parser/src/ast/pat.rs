//! Patterns, as matched in `match` cases.

use serde::{Deserialize, Serialize};
use thrush_common::Location;

use super::ty::Type;
use super::expr::Literal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub location: Location,
    pub ty: Option<Type>,
    pub kind: PatternKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatternKind {
    Wildcard,
    Variable(String),
    Literal(Literal),
    Constructor { name: String, args: Vec<Pattern> },
}

impl Pattern {
    pub fn new(location: Location, kind: PatternKind) -> Pattern {
        Pattern {
            location,
            ty: None,
            kind,
        }
    }
}
