//! Parser-facing error type.
//!
//! The grammar never recovers: the first error halts the containing
//! production and propagates to the caller, carrying the furthest-reaching
//! message selected by `choice`.

use serde::{Deserialize, Serialize};
use thrush_common::Location;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    pub position: Location,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.position.start)
    }
}

impl std::error::Error for ParseError {}

impl From<thrush_combinators::ParseErrorReport> for ParseError {
    fn from(report: thrush_combinators::ParseErrorReport) -> Self {
        ParseError {
            message: report.message,
            position: report.position,
        }
    }
}
