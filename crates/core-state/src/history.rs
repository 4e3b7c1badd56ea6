//! Version counters plus undo/redo stacks, detachable from a model.

use crate::undo::EditStack;
use core_text::{ContentFingerprint, LineBuffer};

/// Everything a model accumulates over its life that may outlive it.
///
/// A live `TextModel` owns one of these. When the model is torn down the state
/// (with a fingerprint of the final content) can be handed to another owner and
/// later bound to a new model whose buffer has the same fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHistoryState {
    pub version_id: u64,
    pub alternative_version_id: u64,
    pub stack: EditStack,
    /// Line structure of the model when the state was detached; `None` while still attached.
    pub last_known_content: Option<ContentFingerprint>,
}

impl ModelHistoryState {
    /// Initial state of a brand new model.
    pub fn fresh() -> Self {
        Self {
            version_id: 1,
            alternative_version_id: 1,
            stack: EditStack::new(),
            last_known_content: None,
        }
    }

    /// Same lines and same EOL as when detached. Stored inverse ranges are only
    /// valid against such a buffer.
    pub fn matches_buffer(&self, buffer: &LineBuffer) -> bool {
        self.last_known_content == Some(buffer.fingerprint())
    }

    pub fn heap_size(&self) -> usize {
        self.stack.heap_size() + std::mem::size_of::<Self>()
    }
}

impl Default for ModelHistoryState {
    fn default() -> Self {
        Self::fresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Eol;

    #[test]
    fn fresh_state_starts_at_version_one() {
        let s = ModelHistoryState::fresh();
        assert_eq!(s.version_id, 1);
        assert_eq!(s.alternative_version_id, 1);
        assert!(s.stack.is_empty());
        assert!(!s.matches_buffer(&LineBuffer::new("", Eol::Lf)));
    }

    #[test]
    fn buffer_match_requires_same_lines_and_eol() {
        let s = ModelHistoryState {
            last_known_content: Some(LineBuffer::new("a\nb", Eol::Lf).fingerprint()),
            ..ModelHistoryState::fresh()
        };
        assert!(s.matches_buffer(&LineBuffer::new("a\nb", Eol::Crlf)));
        assert!(!s.matches_buffer(&LineBuffer::new("a\r\nb", Eol::Lf)));
        assert!(!s.matches_buffer(&LineBuffer::new("a\nb\n", Eol::Lf)));
    }
}
