use formstack_blobstore::{BlobResult, BlobStore, BlobStoreError, MemoryBlobStore};
use formstack_engine::{DEFAULT_SLOTS, EngineError, FileSlotRouter, RawRequest, SlotMode, UploadedFile};
use pretty_assertions::assert_eq;

fn upload(slot: &str, name: &str, bytes: &[u8]) -> UploadedFile {
    UploadedFile::new(slot, name, Some("image/png"), bytes.to_vec())
}

/// Accepts a fixed number of writes, then fails every further one.
struct FlakyBlobs {
    inner: MemoryBlobStore,
    writes_left: std::sync::Mutex<usize>,
}

impl FlakyBlobs {
    fn new(writes: usize) -> Self {
        Self {
            inner: MemoryBlobStore::new(),
            writes_left: std::sync::Mutex::new(writes),
        }
    }
}

impl BlobStore for FlakyBlobs {
    fn write(&self, key: &str, bytes: &[u8]) -> BlobResult<String> {
        let mut left = self.writes_left.lock().unwrap();
        if *left == 0 {
            return Err(BlobStoreError::Storage("disk full".into()));
        }
        *left -= 1;
        self.inner.write(key, bytes)
    }

    fn read(&self, uri: &str) -> BlobResult<Vec<u8>> {
        self.inner.read(uri)
    }

    fn delete(&self, uri: &str) -> BlobResult<()> {
        self.inner.delete(uri)
    }
}

#[test]
fn default_router_knows_builtin_slots() {
    let router = FileSlotRouter::default();
    for slot in DEFAULT_SLOTS {
        assert!(router.is_registered(slot), "{slot}");
    }
    assert!(!router.is_registered("avatar"));
}

#[test]
fn registering_extra_slots() {
    let mut router = FileSlotRouter::with_default_slots();
    assert!(router.register("avatar"));
    assert!(!router.register("avatar"));
    assert!(router.is_registered("avatar"));
    assert_eq!(router.slots().count(), DEFAULT_SLOTS.len() + 1);
}

#[test]
fn fixed_mode_rejects_unregistered_slot() {
    let router = FileSlotRouter::default();
    let request = RawRequest::new().with_file(upload("avatar", "me.png", b"x"));
    let err = router.select(&request, SlotMode::Fixed).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(err.field(), Some("avatar"));
}

#[test]
fn fixed_mode_rejects_two_files_in_one_slot() {
    let router = FileSlotRouter::default();
    let request = RawRequest::new()
        .with_file(upload("studentPhoto", "a.png", b"a"))
        .with_file(upload("studentPhoto", "b.png", b"b"));
    let err = router.select(&request, SlotMode::Fixed).unwrap_err();
    assert_eq!(err.field(), Some("studentPhoto"));
}

#[test]
fn dynamic_mode_accepts_any_slot_and_keeps_the_last_file() {
    let router = FileSlotRouter::default();
    let request = RawRequest::new()
        .with_file(upload("avatar", "a.png", b"a"))
        .with_file(upload("avatar", "b.png", b"b"));
    let selection = router.select(&request, SlotMode::Dynamic).unwrap();
    assert_eq!(selection.len(), 1);
    assert_eq!(selection.get("avatar").unwrap().filename, "b.png");
}

#[test]
fn store_writes_only_requested_slots() {
    let router = FileSlotRouter::default();
    let blobs = MemoryBlobStore::new();
    let request = RawRequest::new()
        .with_file(upload("studentPhoto", "C:\\scans\\Me.PNG", b"photo"))
        .with_file(upload("signature", "sig.png", b"sig"));
    let selection = router.select(&request, SlotMode::Fixed).unwrap();

    let stored = router.store(&selection, ["studentPhoto", "documents"], &blobs).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(blobs.len(), 1);

    let photo = stored.get("studentPhoto").unwrap();
    assert_eq!(photo.original_filename, "Me.PNG");
    assert_eq!(photo.mime_type, "image/png");
    assert_eq!(photo.size_bytes, 5);
    assert!(photo.uri.starts_with("mem://"));
    assert!(photo.uri.ends_with(".png"));
    assert!(!photo.uri.contains("Me"));
    assert_eq!(blobs.read(&photo.uri).unwrap(), b"photo");
}

#[test]
fn missing_content_type_falls_back_to_octet_stream() {
    let router = FileSlotRouter::default();
    let blobs = MemoryBlobStore::new();
    let request = RawRequest::new().with_file(UploadedFile::new("documents", "id", None, b"raw".to_vec()));
    let stored = router.route(&request, SlotMode::Fixed, &blobs).unwrap();
    assert_eq!(stored.get("documents").unwrap().mime_type, "application/octet-stream");
}

#[test]
fn failed_write_removes_earlier_blobs() {
    let router = FileSlotRouter::default();
    let blobs = FlakyBlobs::new(1);
    let request = RawRequest::new()
        .with_file(upload("studentPhoto", "a.png", b"a"))
        .with_file(upload("signature", "b.png", b"b"));
    let selection = router.select(&request, SlotMode::Fixed).unwrap();

    let err = router
        .store(&selection, ["studentPhoto", "signature"], &blobs)
        .unwrap_err();
    assert!(err.is_storage());
    assert!(blobs.inner.is_empty());
}

#[test]
fn rollback_deletes_every_stored_blob() {
    let router = FileSlotRouter::default();
    let blobs = MemoryBlobStore::new();
    let request = RawRequest::new()
        .with_file(upload("studentPhoto", "a.png", b"a"))
        .with_file(upload("signature", "b.png", b"b"));
    let stored = router.route(&request, SlotMode::Fixed, &blobs).unwrap();
    assert_eq!(blobs.len(), 2);

    stored.rollback(&blobs);
    assert!(blobs.is_empty());
}
