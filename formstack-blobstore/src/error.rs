//! Error types for blob storage.

use thiserror::Error;

/// Result type for blob operations.
pub type BlobResult<T> = Result<T, BlobStoreError>;

#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("invalid blob key: {0:?}")]
    InvalidKey(String),

    #[error("URI not owned by this store: {0}")]
    ForeignUri(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(String),
}
