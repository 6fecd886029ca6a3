//! Grant service error types.

use gatekeeper_core::ValidationError;
use gatekeeper_state::StateError;
use thiserror::Error;

/// Errors surfaced to callers of the grant service.
#[derive(Debug, Error)]
pub enum GrantError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] StateError),
}

impl From<StateError> for GrantError {
    fn from(err: StateError) -> Self {
        GrantError::StorageUnavailable(err)
    }
}

pub type GrantResult<T> = Result<T, GrantError>;
