//! Routing of uploaded files by slot name.
//!
//! Create requests may only use registered slots (one per file field across
//! all form types). Update requests accept whatever slot names they carry.
//! A file field's slot is its field name.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use formstack_blobstore::BlobStore;
use formstack_model::{StoredFileRef, ValidationError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{EngineResult, RawRequest, UploadedFile};

/// Slots for the file fields of the built-in form types.
pub const DEFAULT_SLOTS: [&str; 7] = [
    "courseImage",
    "studentPhoto",
    "signature",
    "documents",
    "branchDocument1",
    "branchDocument2",
    "examPaper",
];

const FALLBACK_MIME: &str = "application/octet-stream";
const MAX_EXTENSION_LEN: usize = 16;

/// How slot names in a request are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotMode {
    /// Only registered slots; at most one file per slot.
    Fixed,
    /// Any slot name; the last file per slot wins.
    Dynamic,
}

/// The closed set of upload slots create requests may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSlotRouter {
    slots: BTreeSet<String>,
}

impl FileSlotRouter {
    pub fn new<S: Into<String>>(slots: impl IntoIterator<Item = S>) -> Self {
        Self {
            slots: slots.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn with_default_slots() -> Self {
        Self::new(DEFAULT_SLOTS)
    }

    /// Adds a slot. Returns false if it was already registered.
    pub fn register(&mut self, slot: &str) -> bool {
        self.slots.insert(slot.to_string())
    }

    #[must_use]
    pub fn is_registered(&self, slot: &str) -> bool {
        self.slots.contains(slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(String::as_str)
    }

    /// Picks one upload per slot out of `request`, without writing anything.
    pub fn select<'r>(
        &self,
        request: &'r RawRequest,
        mode: SlotMode,
    ) -> EngineResult<SlotSelection<'r>> {
        let mut uploads = BTreeMap::new();
        for file in request.files() {
            match mode {
                SlotMode::Fixed => {
                    if !self.is_registered(&file.slot) {
                        return Err(ValidationError::field(&file.slot, "unexpected upload slot").into());
                    }
                    if uploads.insert(file.slot.as_str(), file).is_some() {
                        return Err(ValidationError::field(
                            &file.slot,
                            "only one file may be uploaded per slot",
                        )
                        .into());
                    }
                }
                SlotMode::Dynamic => {
                    uploads.insert(file.slot.as_str(), file);
                }
            }
        }
        Ok(SlotSelection { uploads })
    }

    /// Writes the selected uploads for `slots` to `blobs`.
    ///
    /// Slots without an upload are skipped. If any write fails, every blob
    /// this call already wrote is deleted again before the error returns.
    pub fn store<'s>(
        &self,
        selection: &SlotSelection<'_>,
        slots: impl IntoIterator<Item = &'s str>,
        blobs: &dyn BlobStore,
    ) -> EngineResult<StoredUploads> {
        let mut stored = StoredUploads::default();
        for slot in slots {
            let Some(file) = selection.get(slot) else {
                continue;
            };
            let key = storage_key(&file.filename);
            match blobs.write(&key, &file.bytes) {
                Ok(uri) => {
                    debug!("Stored upload for slot {} as {}", slot, uri);
                    stored.refs.insert(slot.to_string(), stored_ref(uri, file));
                }
                Err(e) => {
                    warn!("Upload for slot {} failed, rolling back {} blob(s): {}", slot, stored.len(), e);
                    stored.rollback(blobs);
                    return Err(e.into());
                }
            }
        }
        Ok(stored)
    }

    /// Selects and stores every upload in `request`.
    pub fn route(
        &self,
        request: &RawRequest,
        mode: SlotMode,
        blobs: &dyn BlobStore,
    ) -> EngineResult<StoredUploads> {
        let selection = self.select(request, mode)?;
        let slots: Vec<&str> = selection.slots().collect();
        self.store(&selection, slots, blobs)
    }
}

impl Default for FileSlotRouter {
    fn default() -> Self {
        Self::with_default_slots()
    }
}

/// Uploads picked out of one request, keyed by slot.
#[derive(Debug, Clone, Default)]
pub struct SlotSelection<'r> {
    uploads: BTreeMap<&'r str, &'r UploadedFile>,
}

impl<'r> SlotSelection<'r> {
    #[must_use]
    pub fn get(&self, slot: &str) -> Option<&'r UploadedFile> {
        self.uploads.get(slot).copied()
    }

    #[must_use]
    pub fn contains(&self, slot: &str) -> bool {
        self.uploads.contains_key(slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = &'r str> + '_ {
        self.uploads.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }
}

/// Blobs written for one request, keyed by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredUploads {
    refs: BTreeMap<String, StoredFileRef>,
}

impl StoredUploads {
    #[must_use]
    pub fn get(&self, slot: &str) -> Option<&StoredFileRef> {
        self.refs.get(slot)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StoredFileRef)> {
        self.refs.iter().map(|(slot, file)| (slot.as_str(), file))
    }

    /// Best-effort delete of every blob in this set.
    pub fn rollback(&self, blobs: &dyn BlobStore) {
        for file in self.refs.values() {
            if let Err(e) = blobs.delete(&file.uri) {
                warn!("Could not remove orphaned blob {}: {}", file.uri, e);
            }
        }
    }
}

/// Random storage key keeping the original extension, e.g. `<uuid>.pdf`.
fn storage_key(filename: &str) -> String {
    let id = Uuid::new_v4().simple();
    match extension(filename) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

fn extension(filename: &str) -> Option<String> {
    let ext = Path::new(base_name(filename)).extension()?.to_str()?;
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.bytes().all(|b| b.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

/// Final path component of a client filename, whichever separator it used.
fn base_name(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

fn stored_ref(uri: String, file: &UploadedFile) -> StoredFileRef {
    let original = base_name(&file.filename);
    StoredFileRef {
        uri,
        original_filename: if original.is_empty() {
            "upload".to_string()
        } else {
            original.to_string()
        },
        mime_type: file
            .content_type
            .clone()
            .filter(|mime| !mime.is_empty())
            .unwrap_or_else(|| FALLBACK_MIME.to_string()),
        size_bytes: file.bytes.len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(extension("paper.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension("../../etc/passwd"), None);
        assert_eq!(extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension("weird.p$f"), None);
        assert_eq!(extension("noext"), None);
        assert_eq!(extension(".bashrc"), None);
    }

    #[test]
    fn base_name_strips_both_separators() {
        assert_eq!(base_name("C:\\Users\\me\\scan.png"), "scan.png");
        assert_eq!(base_name("a/b/c.txt"), "c.txt");
        assert_eq!(base_name("plain.txt"), "plain.txt");
    }

    #[test]
    fn storage_keys_are_unique_and_never_the_client_name() {
        let a = storage_key("report.pdf");
        let b = storage_key("report.pdf");
        assert_ne!(a, b);
        assert!(a.ends_with(".pdf"));
        assert!(!a.contains("report"));
    }
}
