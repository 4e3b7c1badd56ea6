use crate::ResourceId;
use core_text::TextError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a live model is already bound to {0}")]
    DuplicateResource(ResourceId),
    #[error("no live model is bound to {0}")]
    UnknownResource(ResourceId),
    #[error(transparent)]
    Edit(#[from] TextError),
}
