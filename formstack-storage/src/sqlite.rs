//! SQLite-backed implementation of both storage contracts.

use chrono::{DateTime, SecondsFormat, Utc};
use formstack_model::{FieldConfig, FieldsData, FormType, Record, RecordId};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::{DocumentStore, MergeOutcome, SchemaStore, StorageError, StorageResult};

const RECORD_COLUMNS: &str = "id, form_type, fields_data, created_at, updated_at";

/// Records and field configuration in one SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                form_type TEXT NOT NULL,
                fields_data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_form_type ON records (form_type, seq);

            CREATE TABLE IF NOT EXISTS field_configs (
                form_type TEXT PRIMARY KEY,
                fields TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

/// A `records` row before JSON and timestamp decoding.
struct RecordRow {
    id: String,
    form_type: String,
    fields_data: String,
    created_at: String,
    updated_at: String,
}

impl RecordRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            form_type: row.get(1)?,
            fields_data: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn into_record(self) -> StorageResult<Record> {
        Ok(Record {
            id: RecordId::parse(&self.id).map_err(|e| StorageError::InvalidData(e.to_string()))?,
            form_type: parse_form_type(&self.form_type)?,
            fields_data: serde_json::from_str(&self.fields_data)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_form_type(raw: &str) -> StorageResult<FormType> {
    FormType::new(raw).map_err(|e| StorageError::InvalidData(e.to_string()))
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidData(format!("invalid timestamp {raw:?}: {e}")))
}

fn select_record(conn: &Connection, id: &RecordId) -> StorageResult<Option<Record>> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1"),
        params![id.to_string()],
        RecordRow::from_row,
    )
    .optional()?
    .map(RecordRow::into_record)
    .transpose()
}

impl DocumentStore for SqliteStore {
    fn insert(&self, record: &Record) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO records (id, form_type, fields_data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.to_string(),
                record.form_type.as_str(),
                serde_json::to_string(&record.fields_data)?,
                format_timestamp(&record.created_at),
                format_timestamp(&record.updated_at),
            ],
        )?;
        debug!("Inserted {} record {}", record.form_type, record.id);
        Ok(())
    }

    fn get(&self, id: &RecordId) -> StorageResult<Option<Record>> {
        let conn = self.lock()?;
        select_record(&conn, id)
    }

    fn list_by_type(&self, form_type: &FormType) -> StorageResult<Vec<Record>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE form_type = ?1 ORDER BY seq"
        ))?;
        let rows = stmt.query_map(params![form_type.as_str()], RecordRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    fn merge_fields(
        &self,
        id: &RecordId,
        fields: FieldsData,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<MergeOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut record =
            select_record(&tx, id)?.ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        let replaced = record.fields_data.merge(fields);
        record.updated_at = updated_at;

        tx.execute(
            "UPDATE records SET fields_data = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                serde_json::to_string(&record.fields_data)?,
                format_timestamp(&record.updated_at),
                id.to_string(),
            ],
        )?;
        tx.commit()?;

        Ok(MergeOutcome { record, replaced })
    }

    fn delete(&self, id: &RecordId) -> StorageResult<Record> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let record =
            select_record(&tx, id)?.ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        tx.execute("DELETE FROM records WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;

        debug!("Deleted {} record {}", record.form_type, id);
        Ok(record)
    }
}

impl SchemaStore for SqliteStore {
    fn load_all(&self) -> StorageResult<BTreeMap<FormType, Vec<FieldConfig>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT form_type, fields FROM field_configs")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut configs = BTreeMap::new();
        for row in rows {
            let (form_type, fields) = row?;
            configs.insert(parse_form_type(&form_type)?, serde_json::from_str(&fields)?);
        }
        Ok(configs)
    }

    fn save(&self, form_type: &FormType, fields: &[FieldConfig]) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO field_configs (form_type, fields, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT (form_type) DO UPDATE SET fields = excluded.fields, updated_at = excluded.updated_at",
            params![
                form_type.as_str(),
                serde_json::to_string(fields)?,
                format_timestamp(&Utc::now()),
            ],
        )?;
        debug!("Saved {} field definitions for {}", fields.len(), form_type);
        Ok(())
    }
}
