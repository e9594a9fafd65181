use chrono::{Duration, Utc};
use formstack_model::{FieldValue, FieldsData, FormType, Record, RecordId};
use formstack_storage::{DocumentStore, MemoryStore, SqliteStore, StorageError};
use pretty_assertions::assert_eq;

fn course(title: &str, fee: i64) -> Record {
    let fields: FieldsData = [
        ("title", FieldValue::Text(title.into())),
        ("fee", FieldValue::Number(fee.into())),
    ]
    .into_iter()
    .collect();
    Record::new(FormType::course(), fields, Utc::now())
}

fn backends() -> Vec<(&'static str, Box<dyn DocumentStore>)> {
    vec![
        ("memory", Box::new(MemoryStore::new())),
        ("sqlite", Box::new(SqliteStore::open_in_memory().unwrap())),
    ]
}

#[test]
fn insert_and_get() {
    for (name, store) in backends() {
        let record = course("Algebra I", 299);
        store.insert(&record).unwrap();
        assert_eq!(store.get(&record.id).unwrap(), Some(record), "{name}");
    }
}

#[test]
fn get_unknown_is_none() {
    for (name, store) in backends() {
        assert_eq!(store.get(&RecordId::new()).unwrap(), None, "{name}");
    }
}

#[test]
fn duplicate_insert_fails() {
    for (name, store) in backends() {
        let record = course("Algebra I", 299);
        store.insert(&record).unwrap();
        assert!(store.insert(&record).is_err(), "{name}");
    }
}

#[test]
fn list_by_type_keeps_insertion_order_and_filters() {
    for (name, store) in backends() {
        let a = course("A", 1);
        let b = course("B", 2);
        let branch = Record::new(FormType::branch(), FieldsData::new(), Utc::now());
        store.insert(&b).unwrap();
        store.insert(&branch).unwrap();
        store.insert(&a).unwrap();

        let courses = store.list_by_type(&FormType::course()).unwrap();
        let titles: Vec<_> = courses.iter().map(|r| r.project_display("title")).collect();
        assert_eq!(titles, vec!["B", "A"], "{name}");
        assert_eq!(store.list_by_type(&FormType::branch()).unwrap().len(), 1, "{name}");
    }
}

#[test]
fn list_empty_type_is_empty() {
    for (name, store) in backends() {
        assert!(store.list_by_type(&FormType::branch()).unwrap().is_empty(), "{name}");
    }
}

#[test]
fn merge_fields_updates_named_values_only() {
    for (name, store) in backends() {
        let record = course("Algebra I", 299);
        store.insert(&record).unwrap();
        let later = record.updated_at + Duration::seconds(5);

        let patch: FieldsData = [("fee", FieldValue::Number(350.into()))].into_iter().collect();
        let outcome = store.merge_fields(&record.id, patch, later).unwrap();

        assert_eq!(outcome.replaced, vec![FieldValue::Number(299.into())], "{name}");
        assert_eq!(outcome.record.project_text("title"), Some("Algebra I"), "{name}");
        assert_eq!(outcome.record.updated_at, later, "{name}");
        assert_eq!(outcome.record.created_at, record.created_at, "{name}");

        let stored = store.get(&record.id).unwrap().unwrap();
        assert_eq!(stored, outcome.record, "{name}");
    }
}

#[test]
fn merge_fields_unknown_id_is_not_found() {
    for (name, store) in backends() {
        let result = store.merge_fields(&RecordId::new(), FieldsData::new(), Utc::now());
        assert!(matches!(result, Err(StorageError::NotFound(_))), "{name}");
    }
}

#[test]
fn delete_returns_removed_record() {
    for (name, store) in backends() {
        let record = course("Algebra I", 299);
        store.insert(&record).unwrap();
        assert_eq!(store.delete(&record.id).unwrap(), record, "{name}");
        assert_eq!(store.get(&record.id).unwrap(), None, "{name}");
        assert!(
            matches!(store.delete(&record.id), Err(StorageError::NotFound(_))),
            "{name}"
        );
    }
}

#[test]
fn sqlite_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("formstack.db");
    let record = course("Geometry", 120);
    {
        let store = SqliteStore::open(&path).unwrap();
        store.insert(&record).unwrap();
    }
    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.get(&record.id).unwrap(), Some(record));
}
