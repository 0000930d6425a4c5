//! Errors surfaced by the editor behaviors.

use crate::backend::BackendError;
use crate::import::ImportError;
use inkstone_core::{InkError, StateError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BehaviorsError {
    #[error(transparent)]
    Ink(#[from] InkError),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StateError> for BehaviorsError {
    fn from(err: StateError) -> Self {
        BehaviorsError::Ink(err.into())
    }
}

/// Result type for editor operations.
pub type BehaviorsResult<T> = Result<T, BehaviorsError>;
