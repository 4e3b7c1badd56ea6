use core_text::{EditOperation, Selection};
use tracing::trace;

/// One atomic edit group with everything needed to undo and redo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditStackElement {
    /// Operations that move the buffer from the "before" to the "after" state.
    pub forward: Vec<EditOperation>,
    /// Operations that move the buffer from the "after" back to the "before" state.
    pub inverse: Vec<EditOperation>,
    pub before_selections: Option<Vec<Selection>>,
    pub after_selections: Option<Vec<Selection>>,
    /// Alternative version id of the model just before the group was pushed.
    pub before_alternative_version_id: u64,
    /// Alternative version id of the model right after the group was pushed.
    pub after_alternative_version_id: u64,
}

impl EditStackElement {
    /// Rough heap footprint, used to budget retained histories.
    pub fn heap_size(&self) -> usize {
        let ops = |v: &[EditOperation]| {
            v.iter()
                .map(|op| op.text.len() + std::mem::size_of::<EditOperation>())
                .sum::<usize>()
        };
        let sels = |v: &Option<Vec<Selection>>| {
            v.as_ref()
                .map_or(0, |s| s.len() * std::mem::size_of::<Selection>())
        };
        ops(&self.forward)
            + ops(&self.inverse)
            + sels(&self.before_selections)
            + sels(&self.after_selections)
            + std::mem::size_of::<Self>()
    }
}

/// Undo and redo stacks for one model.
///
/// Purely a container: applying elements to a buffer and maintaining version
/// counters is the model's job. New pushes invalidate the redo side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditStack {
    undo_stack: Vec<EditStackElement>,
    redo_stack: Vec<EditStackElement>,
}

impl EditStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty() && self.redo_stack.is_empty()
    }

    /// Record a freshly applied group; anything that could have been redone is dropped.
    pub fn push(&mut self, element: EditStackElement) {
        self.undo_stack.push(element);
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "push_element");
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
        }
    }

    pub fn pop_undo(&mut self) -> Option<EditStackElement> {
        let element = self.undo_stack.pop();
        if element.is_some() {
            trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        }
        element
    }

    pub fn pop_redo(&mut self) -> Option<EditStackElement> {
        let element = self.redo_stack.pop();
        if element.is_some() {
            trace!(target: "state.undo", redo_depth = self.redo_stack.len(), undo_depth = self.undo_stack.len(), "redo_pop");
        }
        element
    }

    /// Put an element back on the undo side without touching the redo side.
    pub fn push_undo(&mut self, element: EditStackElement) {
        self.undo_stack.push(element);
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), "undo_push_from_redo");
    }

    pub fn push_redo(&mut self, element: EditStackElement) {
        self.redo_stack.push(element);
        trace!(target: "state.undo", redo_depth = self.redo_stack.len(), "redo_push_from_undo");
    }

    /// Drop all history. Version counters live on the model and are not touched.
    pub fn clear(&mut self) {
        let dropped = self.undo_stack.len() + self.redo_stack.len();
        self.undo_stack.clear();
        self.redo_stack.clear();
        trace!(target: "state.undo", dropped, "stack_cleared");
    }

    pub fn heap_size(&self) -> usize {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .map(EditStackElement::heap_size)
            .sum()
    }
}
