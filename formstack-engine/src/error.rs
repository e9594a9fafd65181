//! Error types for the ingestion engine.

use formstack_blobstore::BlobStoreError;
use formstack_model::{FormType, RecordId, ValidationError};
use formstack_storage::StorageError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The request or field list was rejected; nothing was written.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("record not found: {0}")]
    NotFound(RecordId),

    #[error("field '{field_id}' not found in {form_type} field list")]
    FieldNotFound {
        form_type: FormType,
        field_id: String,
    },

    /// Persistence backend failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Blob backend failure.
    #[error("blob storage error: {0}")]
    Blob(#[from] BlobStoreError),

    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    /// Field the failure is attributed to, for validation failures.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation(e) => e.field.as_deref(),
            _ => None,
        }
    }

    /// True for failures of the persistence or blob backends.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Blob(_) | Self::Io(_))
    }
}
