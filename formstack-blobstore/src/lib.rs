//! Blob storage for uploaded files.
//!
//! The ingestion engine only sees the [`BlobStore`] trait: write bytes under a
//! key and get back an opaque URI, read or delete by that URI. Two backends
//! ship here:
//! - [`FsBlobStore`]: one file per blob under a root directory
//! - [`MemoryBlobStore`]: a map in memory, for tests and ephemeral servers

mod error;
mod fs;
mod memory;

pub use error::{BlobResult, BlobStoreError};
pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;

/// Byte storage addressed by URI.
///
/// Implementations own bytes-on-disk; callers own the decision of when a
/// blob is no longer referenced.
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the URI to address it by.
    /// Keys are single path components; anything else is rejected.
    fn write(&self, key: &str, bytes: &[u8]) -> BlobResult<String>;

    fn read(&self, uri: &str) -> BlobResult<Vec<u8>>;

    /// Fails with [`BlobStoreError::NotFound`] when nothing is stored at `uri`.
    fn delete(&self, uri: &str) -> BlobResult<()>;
}

/// Rejects keys that could escape the storage root or collide with
/// temporary files.
pub(crate) fn validate_key(key: &str) -> BlobResult<()> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.starts_with('.')
        && !key.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(BlobStoreError::InvalidKey(key.to_string()))
    }
}
