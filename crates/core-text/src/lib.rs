//! Line buffers, edit operations and the block diff used for reconciliation.
//!
//! Layering inside this crate:
//! * `eol` – line break styles, detection and normalization.
//! * `position` – 1-based positions, ranges and selections.
//! * `buffer` – `LineBuffer`, an immutable-by-default line view over a rope.
//! * `edit` – `EditOperation`, atomic group application and inverse computation.
//! * `diff` – `compute_edits`, the prefix/suffix block diff between two buffers.
//!
//! Nothing here tracks history or versions; `core-state` layers that on top.

pub mod buffer;
pub mod diff;
pub mod edit;
pub mod eol;
pub mod position;

pub use buffer::{ContentFingerprint, LineBuffer};
pub use diff::compute_edits;
pub use edit::{EditOperation, TextError, apply_edits, compute_inverse};
pub use eol::{Eol, EolCounts, normalize_eol};
pub use position::{Position, Range, Selection};
