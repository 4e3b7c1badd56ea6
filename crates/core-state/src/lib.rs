//! Text model state: buffer, version counters and undo/redo history.
//!
//! Versioning:
//! - `version_id` increases by one on every content change, including undo and
//!   redo. It never goes back.
//! - `alternative_version_id` identifies the *content state*. A genuine edit
//!   assigns the new `version_id` (so it is fresh and never reused); undo
//!   restores the value recorded before the undone group and redo restores the
//!   value recorded after it. A dirty-state comparator can therefore remember
//!   the alternative id at save time and recognize "back at the saved state"
//!   after any number of edit/undo cycles.
//!
//! History:
//! - Every `push_edit_operations` call records one `EditStackElement` holding
//!   the forward group, its inverse, and the selections before/after.
//! - `set_value` replaces the whole content and drops all history; there is
//!   nothing to undo past a full replacement.
//! - The counters and stacks can be detached as a `ModelHistoryState`
//!   (`into_history`) and bound to a later model (`with_history`), which is
//!   how `core-model` keeps history across a close/reopen of the same resource.
//!
//! Telemetry:
//! - Stack mutations trace under `state.undo`; model-level operations under
//!   `state.model`.

use core_text::{
    EditOperation, Eol, LineBuffer, Selection, TextError, apply_edits, compute_edits,
};
use tracing::{trace, warn};

pub mod history;
pub mod undo;

pub use history::ModelHistoryState;
pub use undo::{EditStack, EditStackElement};

/// Result of an undo or redo request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackOutcome {
    /// A group was applied; carries the selections recorded for the restored state.
    Applied(Option<Vec<Selection>>),
    /// Nothing to undo/redo. This is a normal condition, not an error.
    Empty,
}

impl StackOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, StackOutcome::Applied(_))
    }
}

/// A line buffer bound to its edit history.
#[derive(Debug, Clone)]
pub struct TextModel {
    buffer: LineBuffer,
    default_eol: Eol,
    language_id: Option<String>,
    version_id: u64,
    alternative_version_id: u64,
    stack: EditStack,
}

impl TextModel {
    /// New model with fresh history (version 1, empty stacks).
    pub fn new(content: &str, default_eol: Eol, language_id: Option<&str>) -> Self {
        Self::with_history(
            LineBuffer::new(content, default_eol),
            language_id,
            ModelHistoryState::fresh(),
        )
    }

    /// New model that adopts `history`'s counters and stacks verbatim.
    ///
    /// The caller is responsible for only passing a history that
    /// `matches_buffer(&buffer)`; otherwise undo would apply inverse edits to
    /// lines they were not computed for.
    pub fn with_history(
        buffer: LineBuffer,
        language_id: Option<&str>,
        history: ModelHistoryState,
    ) -> Self {
        debug_assert!(
            history.last_known_content.is_none() || history.matches_buffer(&buffer),
            "history bound to a buffer with different line structure"
        );
        let model = Self {
            default_eol: buffer.default_eol(),
            buffer,
            language_id: language_id.map(str::to_owned),
            version_id: history.version_id,
            alternative_version_id: history.alternative_version_id,
            stack: history.stack,
        };
        trace!(
            target: "state.model",
            version_id = model.version_id,
            alternative_version_id = model.alternative_version_id,
            undo_depth = model.stack.undo_depth(),
            eol = %model.buffer.eol(),
            "model_created"
        );
        model
    }

    /// Detach counters, stacks and a fingerprint of the current content.
    pub fn into_history(self) -> ModelHistoryState {
        ModelHistoryState {
            last_known_content: Some(self.buffer.fingerprint()),
            version_id: self.version_id,
            alternative_version_id: self.alternative_version_id,
            stack: self.stack,
        }
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }
    pub fn value(&self) -> String {
        self.buffer.value()
    }
    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }
    pub fn line_content(&self, line_number: usize) -> String {
        self.buffer.line_content(line_number)
    }
    pub fn eol(&self) -> Eol {
        self.buffer.eol()
    }
    pub fn default_eol(&self) -> Eol {
        self.default_eol
    }
    pub fn language_id(&self) -> Option<&str> {
        self.language_id.as_deref()
    }
    pub fn version_id(&self) -> u64 {
        self.version_id
    }
    pub fn alternative_version_id(&self) -> u64 {
        self.alternative_version_id
    }
    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }
    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }
    pub fn stack(&self) -> &EditStack {
        &self.stack
    }

    /// A content change that is not an undo/redo replay.
    fn advance_versions(&mut self) {
        self.version_id += 1;
        self.alternative_version_id = self.version_id;
    }

    /// Apply `ops` as one undoable group.
    ///
    /// Ranges are clamped to the buffer first. `cursor_state_computer` receives the
    /// inverse operations (whose ranges describe where the new text landed) and its
    /// result is stored as the group's after-selections and returned. On error
    /// nothing changes.
    pub fn push_edit_operations<F>(
        &mut self,
        before_selections: Option<&[Selection]>,
        ops: &[EditOperation],
        cursor_state_computer: F,
    ) -> Result<Option<Vec<Selection>>, TextError>
    where
        F: FnOnce(&[EditOperation]) -> Option<Vec<Selection>>,
    {
        if ops.is_empty() {
            return Ok(cursor_state_computer(&[]));
        }
        let forward: Vec<EditOperation> = ops
            .iter()
            .map(|op| EditOperation {
                range: self.buffer.validate_range(op.range),
                ..op.clone()
            })
            .collect();
        let inverse = apply_edits(&mut self.buffer, &forward)?;
        let before_alternative_version_id = self.alternative_version_id;
        self.advance_versions();
        let after_selections = cursor_state_computer(&inverse);
        trace!(
            target: "state.model",
            ops = forward.len(),
            version_id = self.version_id,
            alternative_version_id = self.alternative_version_id,
            "push_edit_operations"
        );
        self.stack.push(EditStackElement {
            forward,
            inverse,
            before_selections: before_selections.map(<[Selection]>::to_vec),
            after_selections: after_selections.clone(),
            before_alternative_version_id,
            after_alternative_version_id: self.alternative_version_id,
        });
        Ok(after_selections)
    }

    /// Revert the most recent group. Empty undo stack is a no-op.
    pub fn undo(&mut self) -> StackOutcome {
        let Some(mut element) = self.stack.pop_undo() else {
            return StackOutcome::Empty;
        };
        // Only a replay across an EOL switch can be rejected; the element is kept.
        match apply_edits(&mut self.buffer, &element.inverse) {
            Ok(forward) => {
                element.forward = forward;
                self.version_id += 1;
                self.alternative_version_id = element.before_alternative_version_id;
                let selections = element.before_selections.clone();
                trace!(target: "state.model", version_id = self.version_id, alternative_version_id = self.alternative_version_id, "undo");
                self.stack.push_redo(element);
                StackOutcome::Applied(selections)
            }
            Err(err) => {
                warn!(target: "state.model", %err, "undo_rejected");
                self.stack.push_undo(element);
                StackOutcome::Empty
            }
        }
    }

    /// Re-apply the most recently undone group. Empty redo stack is a no-op.
    pub fn redo(&mut self) -> StackOutcome {
        let Some(mut element) = self.stack.pop_redo() else {
            return StackOutcome::Empty;
        };
        match apply_edits(&mut self.buffer, &element.forward) {
            Ok(inverse) => {
                element.inverse = inverse;
                self.version_id += 1;
                self.alternative_version_id = element.after_alternative_version_id;
                let selections = element.after_selections.clone();
                trace!(target: "state.model", version_id = self.version_id, alternative_version_id = self.alternative_version_id, "redo");
                self.stack.push_undo(element);
                StackOutcome::Applied(selections)
            }
            Err(err) => {
                warn!(target: "state.model", %err, "redo_rejected");
                self.stack.push_redo(element);
                StackOutcome::Empty
            }
        }
    }

    /// Replace the whole content. Counts as a fresh edit and clears undo/redo.
    pub fn set_value(&mut self, content: &str) {
        self.buffer = LineBuffer::new(content, self.default_eol);
        self.advance_versions();
        self.stack.clear();
        trace!(target: "state.model", version_id = self.version_id, lines = self.buffer.line_count(), "set_value");
    }

    /// Rewrite all line breaks. History is kept; inverse text is normalized when replayed.
    pub fn set_eol(&mut self, eol: Eol) -> Result<(), TextError> {
        if self.buffer.eol() == eol {
            return Ok(());
        }
        self.buffer.set_eol(eol)?;
        self.advance_versions();
        Ok(())
    }

    /// Line-wise equality with another buffer (EOL ignored).
    pub fn equals_text_buffer(&self, other: &LineBuffer) -> bool {
        self.buffer.equals_lines(other)
    }

    /// Bring the content in line with `target` through one undoable block edit.
    /// Returns the pushed operations (empty when already line-equal).
    pub fn reconcile_with(&mut self, target: &LineBuffer) -> Result<Vec<EditOperation>, TextError> {
        let edits = compute_edits(&self.buffer, target);
        if edits.is_empty() {
            return Ok(edits);
        }
        self.push_edit_operations(Some(&[][..]), &edits, |_| Some(Vec::new()))?;
        Ok(edits)
    }
}
