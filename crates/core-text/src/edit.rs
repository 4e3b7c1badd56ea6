//! Range replacements, their inverses, and group application.
//!
//! A group of operations is applied atomically. Ranges are interpreted against
//! the buffer *before* the group; they may touch but must not overlap. Before
//! mutating, the inverse group is derived: each inverse carries the text the
//! operation is about to overwrite and the span its replacement will occupy
//! once the whole group has landed. Operations are then applied in descending
//! document order so earlier offsets stay valid.

use crate::buffer::LineBuffer;
use crate::eol::{Eol, normalize_eol};
use crate::position::{Position, Range};
use serde::Serialize;
use thiserror::Error;
use tracing::trace;

/// A single range replacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EditOperation {
    pub range: Range,
    pub text: String,
    /// Hint for the caller: place the cursor right after the inserted text.
    pub is_replace_move: bool,
}

impl EditOperation {
    pub fn insert(pos: Position, text: impl Into<String>) -> Self {
        Self::replace(Range::empty_at(pos), text)
    }

    pub fn delete(range: Range) -> Self {
        Self::replace(range, String::new())
    }

    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
            is_replace_move: false,
        }
    }

    pub fn replace_move(range: Range, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
            is_replace_move: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("edit ranges {first} and {second} overlap")]
    OverlappingRanges { first: Range, second: Range },
    /// An LF buffer cannot hold a line ending in `\r`: its text would read back as a CRLF break.
    #[error("line {line_number} would end in a carriage return before an LF break")]
    CarriageReturnBeforeLineFeed { line_number: usize },
}

/// An operation resolved against a concrete buffer state.
#[derive(Debug)]
struct PreparedEdit {
    sort_index: usize,
    range: Range,
    start_offset: usize,
    end_offset: usize,
    old_text: String,
    text: String,
    eol_count: usize,
    first_line_length: usize,
    last_line_length: usize,
}

fn prepare(buffer: &LineBuffer, ops: &[EditOperation]) -> Result<Vec<PreparedEdit>, TextError> {
    let eol = buffer.eol();
    let mut prepared = ops
        .iter()
        .enumerate()
        .map(|(sort_index, op)| {
            debug_assert!(
                buffer.is_valid_range(&op.range),
                "edit range {} outside buffer of {} lines",
                op.range,
                buffer.line_count()
            );
            let range = buffer.validate_range(op.range);
            let text = normalize_eol(&op.text, eol).into_owned();
            let mut pieces = text.split(eol.as_str());
            let first_line_length = pieces.next().map_or(0, |p| p.chars().count());
            let (eol_count, last_line_length) = pieces.fold((0, first_line_length), |(n, _), p| {
                (n + 1, p.chars().count())
            });
            PreparedEdit {
                sort_index,
                range,
                start_offset: buffer.offset_at(range.start()),
                end_offset: buffer.offset_at(range.end()),
                old_text: buffer.value_in_range(range),
                text,
                eol_count,
                first_line_length,
                last_line_length,
            }
        })
        .collect::<Vec<_>>();

    prepared.sort_by(|a, b| {
        a.range
            .start()
            .cmp(&b.range.start())
            .then(a.range.end().cmp(&b.range.end()))
            .then(a.sort_index.cmp(&b.sort_index))
    });
    for pair in prepared.windows(2) {
        if pair[1].range.start().is_before(&pair[0].range.end()) {
            return Err(TextError::OverlappingRanges {
                first: pair[0].range,
                second: pair[1].range,
            });
        }
    }
    Ok(prepared)
}

/// Spans the replacements occupy after the group is applied, in ascending order.
fn inverse_ranges(sorted: &[PreparedEdit]) -> Vec<Range> {
    let mut out = Vec::with_capacity(sorted.len());
    let mut prev: Option<(&PreparedEdit, Position)> = None;
    for op in sorted {
        let start = match prev {
            None => op.range.start(),
            Some((prev_op, prev_end)) => {
                if prev_op.range.end_line_number == op.range.start_line_number {
                    Position::new(
                        prev_end.line_number,
                        prev_end.column + (op.range.start_column - prev_op.range.end_column),
                    )
                } else {
                    Position::new(
                        prev_end.line_number
                            + (op.range.start_line_number - prev_op.range.end_line_number),
                        op.range.start_column,
                    )
                }
            }
        };
        let end = if op.eol_count == 0 {
            Position::new(start.line_number, start.column + op.first_line_length)
        } else {
            Position::new(start.line_number + op.eol_count, op.last_line_length + 1)
        };
        out.push(Range::from_positions(start, end));
        prev = Some((op, end));
    }
    out
}

fn assemble_inverse(sorted: &[PreparedEdit], ranges: Vec<Range>) -> Vec<EditOperation> {
    let mut inverse: Vec<(usize, EditOperation)> = sorted
        .iter()
        .zip(ranges)
        .map(|(op, range)| (op.sort_index, EditOperation::replace(range, op.old_text.clone())))
        .collect();
    inverse.sort_by_key(|(idx, _)| *idx);
    inverse.into_iter().map(|(_, op)| op).collect()
}

/// Inverse of `ops` against the current state of `buffer`, in the caller's order.
/// Applying the result to the post-edit buffer restores the current one exactly.
pub fn compute_inverse(
    buffer: &LineBuffer,
    ops: &[EditOperation],
) -> Result<Vec<EditOperation>, TextError> {
    let sorted = prepare(buffer, ops)?;
    let ranges = inverse_ranges(&sorted);
    Ok(assemble_inverse(&sorted, ranges))
}

/// Apply `ops` as one atomic group and return its inverse group.
///
/// Inserted text is normalized to the buffer's EOL. In an LF buffer a group that
/// would leave a `\r` directly before a line break is rejected, so `value()`
/// always reads back as the same lines. On error the buffer is untouched.
pub fn apply_edits(
    buffer: &mut LineBuffer,
    ops: &[EditOperation],
) -> Result<Vec<EditOperation>, TextError> {
    let sorted = prepare(buffer, ops)?;
    let ranges = inverse_ranges(&sorted);
    let mut next = buffer.clone();
    for op in sorted.iter().rev() {
        next.replace_chars(op.start_offset, op.end_offset, &op.text);
    }
    if next.eol() == Eol::Lf {
        let last = next.line_count();
        if let Some(line_number) = ranges
            .iter()
            .flat_map(|r| r.start_line_number..=r.end_line_number)
            .find(|&n| n < last && next.line_ends_in_cr(n))
        {
            trace!(target: "text.edit", line_number, "cr_before_lf_rejected");
            return Err(TextError::CarriageReturnBeforeLineFeed { line_number });
        }
    }
    *buffer = next;
    trace!(target: "text.edit", ops = sorted.len(), lines = buffer.line_count(), "apply_edits");
    Ok(assemble_inverse(&sorted, ranges))
}
