//! Block diff between two line buffers.
//!
//! Strips the common leading and trailing lines and replaces everything in
//! between with one operation. Linear in document length and deterministic;
//! the interior of the changed block is never searched for smaller edits.

use crate::buffer::LineBuffer;
use crate::edit::EditOperation;
use crate::position::Range;
use tracing::trace;

/// Number of equal leading lines, compared by content only.
fn common_prefix(a: &LineBuffer, b: &LineBuffer) -> usize {
    let max = a.line_count().min(b.line_count());
    (1..=max)
        .take_while(|&n| a.line_slice(n) == b.line_slice(n))
        .count()
}

/// Number of equal trailing lines, looking at no more than `max` lines.
fn common_suffix(a: &LineBuffer, b: &LineBuffer, max: usize) -> usize {
    let (a_len, b_len) = (a.line_count(), b.line_count());
    (0..max)
        .take_while(|&i| a.line_slice(a_len - i) == b.line_slice(b_len - i))
        .count()
}

/// Edits turning `old` into `new`: empty when every line matches (EOL style is ignored),
/// otherwise exactly one `replace_move` spanning the differing block.
pub fn compute_edits(old: &LineBuffer, new: &LineBuffer) -> Vec<EditOperation> {
    let old_len = old.line_count();
    let new_len = new.line_count();
    let prefix = common_prefix(old, new);

    if old_len == new_len && prefix == old_len {
        trace!(target: "text.diff", lines = old_len, "no_change");
        return Vec::new();
    }

    let suffix = common_suffix(old, new, old_len.min(new_len) - prefix);

    let (old_range, new_range) = if suffix > 0 {
        (
            Range::new(prefix + 1, 1, old_len - suffix + 1, 1),
            Range::new(prefix + 1, 1, new_len - suffix + 1, 1),
        )
    } else if prefix > 0 {
        // Changed block runs to the end: anchor on the end of the last equal line so the
        // replacement starts with an EOL instead of ending with one.
        (
            Range::new(
                prefix,
                old.line_max_column(prefix),
                old_len,
                old.line_max_column(old_len),
            ),
            Range::new(
                prefix,
                new.line_max_column(prefix),
                new_len,
                new.line_max_column(new_len),
            ),
        )
    } else {
        (
            Range::new(1, 1, old_len, old.line_max_column(old_len)),
            Range::new(1, 1, new_len, new.line_max_column(new_len)),
        )
    };

    let text = new.value_in_range(new_range);
    trace!(
        target: "text.diff",
        old_len,
        new_len,
        prefix,
        suffix,
        range = %old_range,
        text_len = text.len(),
        "block_edit"
    );
    vec![EditOperation::replace_move(old_range, text)]
}
