//! Positions, ranges and selections.
//!
//! Everything here is 1-based: the first line is line 1 and the first column
//! is column 1. Columns count Unicode scalar values (chars), so a position is
//! independent of the byte encoding of the line and of the buffer's EOL.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A location between two characters: `(line_number, column)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub line_number: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line_number: usize, column: usize) -> Self {
        Self {
            line_number,
            column,
        }
    }

    /// Start of the document.
    pub const fn origin() -> Self {
        Self::new(1, 1)
    }

    pub fn is_before(&self, other: &Position) -> bool {
        self < other
    }

    pub fn is_before_or_equal(&self, other: &Position) -> bool {
        self <= other
    }

    /// Clamp into a document of `line_count` lines, where `max_column_fn(line)` yields
    /// the column just past the end of that line.
    pub fn clamp_to<F>(&mut self, line_count: usize, mut max_column_fn: F)
    where
        F: FnMut(usize) -> usize,
    {
        let line_count = line_count.max(1);
        self.line_number = self.line_number.clamp(1, line_count);
        let max = max_column_fn(self.line_number).max(1);
        self.column = self.column.clamp(1, max);
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line_number
            .cmp(&other.line_number)
            .then(self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line_number, self.column)
    }
}

/// A span between two positions, always stored with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    pub start_line_number: usize,
    pub start_column: usize,
    pub end_line_number: usize,
    pub end_column: usize,
}

impl Range {
    /// Build a range; the endpoints are swapped when given in reverse document order.
    pub fn new(
        start_line_number: usize,
        start_column: usize,
        end_line_number: usize,
        end_column: usize,
    ) -> Self {
        Self::from_positions(
            Position::new(start_line_number, start_column),
            Position::new(end_line_number, end_column),
        )
    }

    pub fn from_positions(a: Position, b: Position) -> Self {
        let (start, end) = if b < a { (b, a) } else { (a, b) };
        Self {
            start_line_number: start.line_number,
            start_column: start.column,
            end_line_number: end.line_number,
            end_column: end.column,
        }
    }

    /// Zero-width range at `pos`.
    pub fn empty_at(pos: Position) -> Self {
        Self::from_positions(pos, pos)
    }

    pub fn start(&self) -> Position {
        Position::new(self.start_line_number, self.start_column)
    }

    pub fn end(&self) -> Position {
        Position::new(self.end_line_number, self.end_column)
    }

    pub fn is_empty(&self) -> bool {
        self.start() == self.end()
    }

    pub fn contains_position(&self, pos: Position) -> bool {
        self.start() <= pos && pos <= self.end()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{} -> {},{}]",
            self.start_line_number, self.start_column, self.end_line_number, self.end_column
        )
    }
}

/// A cursor selection: the anchor (`selection_start`) and the active end (`position`).
/// Unlike `Range` the anchor may sit after the active end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Selection {
    pub selection_start: Position,
    pub position: Position,
}

impl Selection {
    pub fn new(
        selection_start_line_number: usize,
        selection_start_column: usize,
        position_line_number: usize,
        position_column: usize,
    ) -> Self {
        Self {
            selection_start: Position::new(selection_start_line_number, selection_start_column),
            position: Position::new(position_line_number, position_column),
        }
    }

    /// Empty selection (plain cursor) at `pos`.
    pub fn collapsed(pos: Position) -> Self {
        Self {
            selection_start: pos,
            position: pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selection_start == self.position
    }

    /// The covered span in document order.
    pub fn range(&self) -> Range {
        Range::from_positions(self.selection_start, self.position)
    }
}
