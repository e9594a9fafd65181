use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{BlobResult, BlobStore, BlobStoreError, validate_key};

const SCHEME: &str = "mem://";

/// Keeps blobs in a map. URIs have the form `mem://<key>`.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key_for(uri: &str) -> BlobResult<&str> {
        uri.strip_prefix(SCHEME)
            .ok_or_else(|| BlobStoreError::ForeignUri(uri.to_string()))
    }
}

impl BlobStore for MemoryBlobStore {
    fn write(&self, key: &str, bytes: &[u8]) -> BlobResult<String> {
        validate_key(key)?;
        self.lock().insert(key.to_string(), bytes.to_vec());
        Ok(format!("{SCHEME}{key}"))
    }

    fn read(&self, uri: &str) -> BlobResult<Vec<u8>> {
        let key = Self::key_for(uri)?;
        self.lock()
            .get(key)
            .cloned()
            .ok_or_else(|| BlobStoreError::NotFound(uri.to_string()))
    }

    fn delete(&self, uri: &str) -> BlobResult<()> {
        let key = Self::key_for(uri)?;
        self.lock()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BlobStoreError::NotFound(uri.to_string()))
    }
}
