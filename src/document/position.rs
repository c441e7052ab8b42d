use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Zero-based line and column, column counted in chars. Orders in document order.
#[derive(
    Serialize, Deserialize, Clone, Debug, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A range between two positions, always stored with `start <= end`.
#[derive(Serialize, Deserialize, Clone, Debug, Copy, Default, Eq, PartialEq, Hash)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

/// The user-highlighted range of an edit session.
pub type Selection = TextRange;

impl TextRange {
    /// Build a range from two positions in either order.
    pub fn new(a: Position, b: Position) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn empty(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Display for TextRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_normalize_to_document_order() {
        let range = TextRange::new(Position::new(3, 1), Position::new(1, 4));
        assert_eq!(range.start, Position::new(1, 4));
        assert_eq!(range.end, Position::new(3, 1));
    }

    #[test]
    fn same_line_orders_by_column() {
        let range = TextRange::new(Position::new(2, 9), Position::new(2, 3));
        assert_eq!(range.start.column, 3);
        assert_eq!(range.end.column, 9);
        assert!(!range.is_empty());
    }

    #[test]
    fn display_is_one_based() {
        let range = TextRange::new(Position::new(0, 0), Position::new(1, 4));
        assert_eq!(range.to_string(), "1:1-2:5");
    }
}
