//! Error types for the Gatekeeper state store.

use thiserror::Error;

/// Result type alias for state store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during state store operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("collection {0} did not become ready")]
    NotReady(String),

    #[error("expiry already enabled on {collection} for attribute {attribute}")]
    ExpiryAlreadyEnabled {
        collection: String,
        attribute: String,
    },

    #[error("expiry on {collection} already uses attribute {existing}, not {requested}")]
    ExpiryConflict {
        collection: String,
        existing: String,
        requested: String,
    },
}
