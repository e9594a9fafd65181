//! In-process document and schema store.
//!
//! Holds everything in maps behind one mutex, so a merge is atomic the same
//! way a SQLite transaction is. Nothing survives a restart.

use chrono::{DateTime, Utc};
use formstack_model::{FieldConfig, FieldsData, FormType, Record, RecordId};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::{DocumentStore, MergeOutcome, SchemaStore, StorageError, StorageResult};

#[derive(Debug, Default)]
struct Inner {
    /// Insertion order doubles as natural storage order.
    records: Vec<Record>,
    schemas: BTreeMap<FormType, Vec<FieldConfig>>,
}

/// Keeps records and field configuration in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&self, record: &Record) -> StorageResult<()> {
        let mut inner = self.lock()?;
        if inner.records.iter().any(|r| r.id == record.id) {
            return Err(StorageError::InvalidData(format!(
                "record {} already exists",
                record.id
            )));
        }
        inner.records.push(record.clone());
        Ok(())
    }

    fn get(&self, id: &RecordId) -> StorageResult<Option<Record>> {
        Ok(self.lock()?.records.iter().find(|r| r.id == *id).cloned())
    }

    fn list_by_type(&self, form_type: &FormType) -> StorageResult<Vec<Record>> {
        Ok(self
            .lock()?
            .records
            .iter()
            .filter(|r| r.form_type == *form_type)
            .cloned()
            .collect())
    }

    fn merge_fields(
        &self,
        id: &RecordId,
        fields: FieldsData,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<MergeOutcome> {
        let mut inner = self.lock()?;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == *id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        let replaced = record.fields_data.merge(fields);
        record.updated_at = updated_at;
        Ok(MergeOutcome {
            record: record.clone(),
            replaced,
        })
    }

    fn delete(&self, id: &RecordId) -> StorageResult<Record> {
        let mut inner = self.lock()?;
        let index = inner
            .records
            .iter()
            .position(|r| r.id == *id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(inner.records.remove(index))
    }
}

impl SchemaStore for MemoryStore {
    fn load_all(&self) -> StorageResult<BTreeMap<FormType, Vec<FieldConfig>>> {
        Ok(self.lock()?.schemas.clone())
    }

    fn save(&self, form_type: &FormType, fields: &[FieldConfig]) -> StorageResult<()> {
        self.lock()?
            .schemas
            .insert(form_type.clone(), fields.to_vec());
        Ok(())
    }
}
