use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{BlobResult, BlobStore, BlobStoreError, validate_key};

/// Stores each blob as one file under `root`.
///
/// URIs have the form `<uri_prefix>/<key>`, so the prefix can match the path
/// a static file server exposes `root` under.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    uri_prefix: String,
}

impl FsBlobStore {
    /// Opens (or creates) a blob directory.
    pub fn open(root: impl Into<PathBuf>, uri_prefix: &str) -> BlobResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            uri_prefix: uri_prefix.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn uri_for(&self, key: &str) -> String {
        format!("{}/{}", self.uri_prefix, key)
    }

    fn key_for<'a>(&self, uri: &'a str) -> BlobResult<&'a str> {
        let key = uri
            .strip_prefix(self.uri_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| BlobStoreError::ForeignUri(uri.to_string()))?;
        validate_key(key)?;
        Ok(key)
    }
}

impl BlobStore for FsBlobStore {
    fn write(&self, key: &str, bytes: &[u8]) -> BlobResult<String> {
        validate_key(key)?;
        let target = self.root.join(key);
        // Write beside the target and rename so readers never see a partial file.
        let partial = self.root.join(format!(".{key}.part"));
        let result = fs::File::create(&partial)
            .and_then(|mut file| {
                file.write_all(bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&partial, &target));
        if let Err(e) = result {
            if let Err(cleanup) = fs::remove_file(&partial) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove partial blob {}: {}", partial.display(), cleanup);
                }
            }
            return Err(e.into());
        }
        debug!("Stored blob {} ({} bytes)", key, bytes.len());
        Ok(self.uri_for(key))
    }

    fn read(&self, uri: &str) -> BlobResult<Vec<u8>> {
        let key = self.key_for(uri)?;
        fs::read(self.root.join(key)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BlobStoreError::NotFound(uri.to_string()),
            _ => e.into(),
        })
    }

    fn delete(&self, uri: &str) -> BlobResult<()> {
        let key = self.key_for(uri)?;
        fs::remove_file(self.root.join(key)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BlobStoreError::NotFound(uri.to_string()),
            _ => e.into(),
        })?;
        debug!("Deleted blob {}", key);
        Ok(())
    }
}
