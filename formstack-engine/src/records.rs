//! Create, replace, read and delete records of any form type.

use chrono::Utc;
use formstack_blobstore::BlobStore;
use formstack_model::{FieldValue, FormType, Record, RecordId};
use formstack_storage::{DocumentStore, StorageError};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::codec::{self, DecodeMode, EncodedRecord, RecordView};
use crate::{EngineError, EngineResult, FieldRegistry, RawRequest, SlotMode, write_csv};

/// The generic record service.
///
/// Every write decodes against the registry's current field list before any
/// blob is written, and deletes the blobs it wrote if persisting fails.
pub struct RecordStore {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    registry: Arc<FieldRegistry>,
}

impl RecordStore {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        registry: Arc<FieldRegistry>,
    ) -> Self {
        Self {
            documents,
            blobs,
            registry,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<FieldRegistry> {
        &self.registry
    }

    /// Validates `request` against the field list of `form_type`, stores its
    /// uploads and persists a new record.
    pub fn create(&self, form_type: &FormType, request: &RawRequest) -> EngineResult<Record> {
        let fields = self.registry.get_fields(form_type);
        let router = self.registry.router();

        let selection = router.select(request, SlotMode::Fixed)?;
        let decoded = codec::decode(&fields, request, &selection, DecodeMode::Create)?;
        let stored = router.store(&selection, decoded.file_slots(), self.blobs.as_ref())?;

        let record = Record::new(form_type.clone(), decoded.attach(&stored), Utc::now());
        if let Err(e) = self.documents.insert(&record) {
            warn!("Persisting new {} record failed: {}", form_type, e);
            stored.rollback(self.blobs.as_ref());
            return Err(e.into());
        }

        info!(
            "Created {} record {} ({} field(s), {} file(s))",
            form_type,
            record.id,
            record.fields_data.len(),
            stored.len()
        );
        Ok(record)
    }

    /// Merges the fields `request` supplies onto an existing record. Fields
    /// the request leaves out keep their values.
    pub fn replace(&self, id: &RecordId, request: &RawRequest) -> EngineResult<Record> {
        let existing = self.get(id)?;
        let fields = self.registry.get_fields(&existing.form_type);
        let router = self.registry.router();

        let selection = router.select(request, SlotMode::Dynamic)?;
        let decoded = codec::decode(&fields, request, &selection, DecodeMode::Update)?;
        let stored = router.store(&selection, decoded.file_slots(), self.blobs.as_ref())?;

        let outcome = match self
            .documents
            .merge_fields(id, decoded.attach(&stored), Utc::now())
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Updating record {} failed: {}", id, e);
                stored.rollback(self.blobs.as_ref());
                return Err(match e {
                    StorageError::NotFound(_) => EngineError::NotFound(*id),
                    other => other.into(),
                });
            }
        };

        for value in &outcome.replaced {
            match value {
                FieldValue::File(file) => self.evict(&file.uri),
                FieldValue::Text(_)
                | FieldValue::Number(_)
                | FieldValue::Date(_)
                | FieldValue::Select(_) => {}
            }
        }

        info!(
            "Replaced {} field(s) of {} record {}",
            outcome.replaced.len(),
            outcome.record.form_type,
            id
        );
        Ok(outcome.record)
    }

    pub fn get(&self, id: &RecordId) -> EngineResult<Record> {
        self.documents
            .get(id)?
            .ok_or(EngineError::NotFound(*id))
    }

    /// Every record of `form_type` in insertion order.
    pub fn list_by_type(&self, form_type: &FormType) -> EngineResult<Vec<Record>> {
        let records = self.documents.list_by_type(form_type)?;
        debug!("Listed {} {} record(s)", records.len(), form_type);
        Ok(records)
    }

    /// Deletes a record, then the blobs it referenced. Blob failures are
    /// logged and do not fail the call.
    pub fn delete_by_id(&self, id: &RecordId) -> EngineResult<Record> {
        let record = self.documents.delete(id).map_err(|e| match e {
            StorageError::NotFound(_) => EngineError::NotFound(*id),
            other => other.into(),
        })?;

        for file in record.fields_data.file_refs() {
            self.evict(&file.uri);
        }
        info!("Deleted {} record {}", record.form_type, id);
        Ok(record)
    }

    /// Encodes `record` against the current field list of its form type.
    #[must_use]
    pub fn encode(&self, record: &Record, view: RecordView) -> EncodedRecord {
        let fields = self.registry.get_fields(&record.form_type);
        codec::encode(record, &fields, view)
    }

    /// CSV of every record of `form_type`, columns in field-list order.
    pub fn export_csv(&self, form_type: &FormType) -> EngineResult<Vec<u8>> {
        let fields = self.registry.get_fields(form_type);
        let records = self.list_by_type(form_type)?;
        let mut out = Vec::new();
        write_csv(&fields, &records, &mut out)?;
        Ok(out)
    }

    fn evict(&self, uri: &str) {
        match self.blobs.delete(uri) {
            Ok(()) => debug!("Evicted blob {}", uri),
            Err(e) => warn!("Could not delete blob {}: {}", uri, e),
        }
    }
}
