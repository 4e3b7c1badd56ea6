//! Model lifecycle registry.
//!
//! A `ModelRegistry` owns every live `TextModel`, keyed by `ResourceId`, and a
//! retention slot per resource for models that have been destroyed.
//!
//! Lifecycle rules:
//! * `create_model` binds a new model to a resource. If a retained history
//!   exists whose recorded `ContentFingerprint` equals the new buffer's (same
//!   lines, same EOL), the model adopts that history (counters and both
//!   stacks) and the slot is emptied. Stored inverse ranges are only valid
//!   against that exact line structure. Any other retained history for the
//!   resource is discarded.
//! * `destroy_model` removes the live model and moves its history into the
//!   retention slot, subject to the memory budget (see `retention`).
//! * Models created without a resource get a minted `ResourceId::Anonymous`
//!   identity (shown as `inmemory://model/N`); they always start fresh and are
//!   never retained. A caller-supplied id is always retained, whatever its text.
//! * Errors on one resource never touch another resource's state.
//!
//! The default EOL of each new model comes from an `EolProvider`, consulted
//! once at creation time.

use core_config::Config;
use core_state::{ModelHistoryState, StackOutcome, TextModel};
use core_text::{EditOperation, LineBuffer, Selection};
use std::collections::BTreeMap;
use tracing::debug;

mod error;
mod provider;
mod resource;
pub mod retention;

pub use error::RegistryError;
pub use provider::{EolProvider, FixedEol};
pub use resource::ResourceId;
pub use retention::RetainedHistories;

#[derive(Debug)]
pub struct ModelRegistry<P = FixedEol> {
    provider: P,
    models: BTreeMap<ResourceId, TextModel>,
    retained: RetainedHistories,
    next_anonymous: u64,
}

impl ModelRegistry<Config> {
    /// Registry using `config` both for EOL defaults and the retention budget.
    pub fn from_config(config: Config) -> Self {
        let budget = config.max_memory_for_closed_files_undo_stack();
        Self::new(config, budget)
    }
}

impl<P: EolProvider> ModelRegistry<P> {
    pub fn new(provider: P, retention_budget_bytes: usize) -> Self {
        Self {
            provider,
            models: BTreeMap::new(),
            retained: RetainedHistories::new(retention_budget_bytes),
            next_anonymous: 1,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn mint_anonymous(&mut self) -> ResourceId {
        loop {
            let id = ResourceId::anonymous(self.next_anonymous);
            self.next_anonymous += 1;
            if !self.models.contains_key(&id) {
                return id;
            }
        }
    }

    /// Create a model for `content` and bind it to `resource` (or a minted anonymous id).
    pub fn create_model(
        &mut self,
        content: &str,
        language_id: Option<&str>,
        resource: Option<ResourceId>,
    ) -> Result<ResourceId, RegistryError> {
        let default_eol = self.provider.eol(resource.as_ref(), language_id);
        let Some(resource) = resource else {
            let id = self.mint_anonymous();
            let model = TextModel::new(content, default_eol, language_id);
            debug!(target: "model.registry", resource = %id, eol = %model.eol(), "model_created_anonymous");
            self.models.insert(id.clone(), model);
            return Ok(id);
        };
        if self.models.contains_key(&resource) {
            return Err(RegistryError::DuplicateResource(resource));
        }
        let buffer = LineBuffer::new(content, default_eol);
        let history = match self.retained.take(&resource) {
            Some(history) if history.matches_buffer(&buffer) => {
                debug!(
                    target: "model.retention",
                    %resource,
                    version_id = history.version_id,
                    alternative_version_id = history.alternative_version_id,
                    undo_depth = history.stack.undo_depth(),
                    "retained_state_restored"
                );
                history
            }
            Some(_) => {
                debug!(target: "model.retention", %resource, "retained_state_discarded_content_mismatch");
                ModelHistoryState::fresh()
            }
            None => ModelHistoryState::fresh(),
        };
        let model = TextModel::with_history(buffer, language_id, history);
        debug!(
            target: "model.registry",
            %resource,
            eol = %model.eol(),
            version_id = model.version_id(),
            "model_created"
        );
        self.models.insert(resource.clone(), model);
        Ok(resource)
    }

    /// Tear down the live model; its history moves into the retention slot.
    pub fn destroy_model(&mut self, resource: &ResourceId) -> Result<(), RegistryError> {
        let model = self
            .models
            .remove(resource)
            .ok_or_else(|| RegistryError::UnknownResource(resource.clone()))?;
        debug!(target: "model.registry", %resource, version_id = model.version_id(), "model_destroyed");
        if resource.is_anonymous() {
            return Ok(());
        }
        self.retained.retain(resource.clone(), model.into_history());
        Ok(())
    }

    pub fn model(&self, resource: &ResourceId) -> Result<&TextModel, RegistryError> {
        self.models
            .get(resource)
            .ok_or_else(|| RegistryError::UnknownResource(resource.clone()))
    }

    pub fn model_mut(&mut self, resource: &ResourceId) -> Result<&mut TextModel, RegistryError> {
        self.models
            .get_mut(resource)
            .ok_or_else(|| RegistryError::UnknownResource(resource.clone()))
    }

    pub fn models(&self) -> impl Iterator<Item = (&ResourceId, &TextModel)> {
        self.models.iter()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn is_retained(&self, resource: &ResourceId) -> bool {
        self.retained.contains(resource)
    }

    pub fn retained(&self) -> &RetainedHistories {
        &self.retained
    }

    pub fn push_edit_operations<F>(
        &mut self,
        resource: &ResourceId,
        before_selections: Option<&[Selection]>,
        ops: &[EditOperation],
        cursor_state_computer: F,
    ) -> Result<Option<Vec<Selection>>, RegistryError>
    where
        F: FnOnce(&[EditOperation]) -> Option<Vec<Selection>>,
    {
        let model = self.model_mut(resource)?;
        Ok(model.push_edit_operations(before_selections, ops, cursor_state_computer)?)
    }

    pub fn undo(&mut self, resource: &ResourceId) -> Result<StackOutcome, RegistryError> {
        Ok(self.model_mut(resource)?.undo())
    }

    pub fn redo(&mut self, resource: &ResourceId) -> Result<StackOutcome, RegistryError> {
        Ok(self.model_mut(resource)?.redo())
    }

    pub fn set_value(&mut self, resource: &ResourceId, content: &str) -> Result<(), RegistryError> {
        self.model_mut(resource)?.set_value(content);
        Ok(())
    }

    /// Reconcile the live model with `new_content` through one undoable block edit.
    ///
    /// The new text is read with the model's current EOL; a pure EOL difference
    /// is not an edit. Returns the pushed operations, empty when already line-equal.
    pub fn update_model(
        &mut self,
        resource: &ResourceId,
        new_content: &str,
    ) -> Result<Vec<EditOperation>, RegistryError> {
        let model = self.model_mut(resource)?;
        let target = LineBuffer::new(new_content, model.eol());
        let edits = model.reconcile_with(&target)?;
        debug!(target: "model.registry", %resource, edits = edits.len(), version_id = model.version_id(), "model_updated");
        Ok(edits)
    }
}
