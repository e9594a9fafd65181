//! Persistence layer for formstack.
//!
//! Two contracts, each with a SQLite and an in-memory backend:
//! - [`DocumentStore`]: record documents keyed by id and form type
//! - [`SchemaStore`]: the field-configuration document, one list per form type
//!
//! # Architecture
//!
//! - A record's `fieldsData` is stored as one JSON column; no per-field columns
//! - Field merges happen inside the store so they are atomic per record
//! - Listing returns natural insertion order; there is no query language

mod error;
mod memory;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use formstack_model::{FieldConfig, FieldValue, FieldsData, FormType, Record, RecordId};
use std::collections::BTreeMap;

/// Result of merging new field values onto a stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The record as persisted after the merge.
    pub record: Record,
    /// Values the merge overwrote, in merge order.
    pub replaced: Vec<FieldValue>,
}

/// Per-document persistence for records.
pub trait DocumentStore: Send + Sync {
    /// Persists a new record. Its id must not exist yet.
    fn insert(&self, record: &Record) -> StorageResult<()>;

    fn get(&self, id: &RecordId) -> StorageResult<Option<Record>>;

    /// Every record of `form_type`, in insertion order.
    fn list_by_type(&self, form_type: &FormType) -> StorageResult<Vec<Record>>;

    /// Writes `fields` over the stored record's field values and bumps
    /// `updated_at`, as one atomic step. Names absent from `fields` keep their
    /// values. Fails with [`StorageError::NotFound`] for an unknown id.
    fn merge_fields(
        &self,
        id: &RecordId,
        fields: FieldsData,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<MergeOutcome>;

    /// Removes a record and returns it. Fails with [`StorageError::NotFound`]
    /// for an unknown id.
    fn delete(&self, id: &RecordId) -> StorageResult<Record>;
}

/// Persistence for the field-configuration document.
pub trait SchemaStore: Send + Sync {
    /// Every form type that has ever been configured.
    fn load_all(&self) -> StorageResult<BTreeMap<FormType, Vec<FieldConfig>>>;

    /// Replaces the stored list for one form type.
    fn save(&self, form_type: &FormType, fields: &[FieldConfig]) -> StorageResult<()>;
}
