//! Source locations.
//!
//! Every token and AST node carries a [`Location`] spanning the source text
//! it was built from. Positions are tracked as 1-based (line, column) pairs
//! rather than byte offsets, since nothing downstream of the lexer needs to
//! re-slice the original source by location -- tokens already carry their
//! own text.

use serde::{Deserialize, Serialize};

/// A single point in the source text: 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl Position {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// The position a fresh cursor starts at.
    pub fn start() -> Self {
        Self { line: 1, col: 1 }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A span of source text. `start` is inclusive, `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width location, used for synthetic nodes with no source text.
    pub fn synthetic() -> Self {
        let p = Position::start();
        Self { start: p, end: p }
    }

    /// Merge two locations into one spanning both.
    pub fn merge(self, other: Location) -> Location {
        Location {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_takes_the_widest_span() {
        let a = Location::new(Position::new(1, 1), Position::new(1, 5));
        let b = Location::new(Position::new(1, 3), Position::new(2, 1));
        let merged = a.merge(b);
        assert_eq!(merged.start, Position::new(1, 1));
        assert_eq!(merged.end, Position::new(2, 1));
    }

    #[test]
    fn synthetic_is_zero_width() {
        let loc = Location::synthetic();
        assert_eq!(loc.start, loc.end);
    }
}
