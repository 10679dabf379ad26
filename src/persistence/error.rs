//! Error types for the persistence module.

use thiserror::Error;

/// Errors raised by a raw key-value store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing the backing file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A value could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The key cannot be mapped to a storage location.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Convenience result alias for store operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;
