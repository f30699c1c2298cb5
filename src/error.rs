//! Error types for cascade sharing

use thiserror::Error;

use crate::object::ObjectKey;

/// The main error type for cascade sharing operations
#[derive(Debug, Clone, Error)]
pub enum CascadeError {
    /// A dashboard or object was requested that is not part of the graph or store
    #[error("object not found: {0}")]
    NotFound(ObjectKey),

    /// An access string could not be parsed
    #[error("invalid access string `{0}`: {1}")]
    InvalidAccess(String, String),

    /// The persistence backend failed
    #[error("store error: {0}")]
    Store(String),

    /// A stored object could not be encoded or decoded
    #[error("codec error: {0}")]
    Codec(String),

    /// The stored object moved on since it was read
    #[error("{key} was read at revision {expected} but the store is at {found}")]
    Conflict { key: ObjectKey, expected: u64, found: u64 },

    #[error("store not initialized")]
    NotInitialized,

    #[error("store already initialized at {0}")]
    AlreadyInitialized(String),
}

/// Result type alias for cascade sharing operations
pub type Result<T> = std::result::Result<T, CascadeError>;

/// Convert a backend error into a `CascadeError::Store`
pub fn err<E: std::error::Error>(e: E) -> CascadeError {
    CascadeError::Store(e.to_string())
}

impl From<serde_json::Error> for CascadeError {
    fn from(e: serde_json::Error) -> Self {
        CascadeError::Codec(e.to_string())
    }
}
