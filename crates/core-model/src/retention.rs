//! Histories of destroyed models, kept so a reopened resource can resume them.
//!
//! At most one state per resource. The sum of retained `heap_size`s never
//! exceeds the budget: retaining a state evicts the oldest retained states
//! until it fits, and a state larger than the whole budget is dropped.

use crate::ResourceId;
use core_state::ModelHistoryState;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug)]
struct Retained {
    seq: u64,
    size: usize,
    state: ModelHistoryState,
}

#[derive(Debug)]
pub struct RetainedHistories {
    entries: HashMap<ResourceId, Retained>,
    budget_bytes: usize,
    total_bytes: usize,
    next_seq: u64,
}

impl RetainedHistories {
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            budget_bytes,
            total_bytes: 0,
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn contains(&self, resource: &ResourceId) -> bool {
        self.entries.contains_key(resource)
    }
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }
    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    /// Store `state` for `resource`, replacing any previous one. Returns whether it was kept.
    pub fn retain(&mut self, resource: ResourceId, state: ModelHistoryState) -> bool {
        self.discard(&resource);
        let size = state.heap_size();
        if size > self.budget_bytes {
            debug!(target: "model.retention", %resource, size, budget = self.budget_bytes, "state_exceeds_budget_dropped");
            return false;
        }
        while self.total_bytes + size > self.budget_bytes {
            if !self.evict_oldest() {
                break;
            }
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.total_bytes += size;
        debug!(target: "model.retention", %resource, size, total = self.total_bytes, undo_depth = state.stack.undo_depth(), "state_retained");
        self.entries.insert(resource, Retained { seq, size, state });
        true
    }

    /// Remove and return the state for `resource`.
    pub fn take(&mut self, resource: &ResourceId) -> Option<ModelHistoryState> {
        let entry = self.entries.remove(resource)?;
        self.total_bytes -= entry.size;
        Some(entry.state)
    }

    pub fn discard(&mut self, resource: &ResourceId) -> bool {
        self.take(resource).is_some()
    }

    fn evict_oldest(&mut self) -> bool {
        let Some(oldest) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.seq)
            .map(|(resource, _)| resource.clone())
        else {
            return false;
        };
        if let Some(entry) = self.entries.remove(&oldest) {
            self.total_bytes -= entry.size;
            debug!(target: "model.retention", resource = %oldest, size = entry.size, "state_evicted");
        }
        true
    }
}
