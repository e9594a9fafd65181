use formstack_model::{FieldConfig, FormType};
use formstack_storage::{MemoryStore, SchemaStore, SqliteStore};
use pretty_assertions::assert_eq;

fn course_fields() -> Vec<FieldConfig> {
    vec![
        FieldConfig::text("c1", "title", "Title"),
        FieldConfig::number("c2", "fee", "Fee"),
        FieldConfig::select("c3", "level", "Level", ["Intro", "Advanced"]),
    ]
}

fn backends() -> Vec<(&'static str, Box<dyn SchemaStore>)> {
    vec![
        ("memory", Box::new(MemoryStore::new())),
        ("sqlite", Box::new(SqliteStore::open_in_memory().unwrap())),
    ]
}

#[test]
fn load_all_empty_when_never_configured() {
    for (name, store) in backends() {
        assert!(store.load_all().unwrap().is_empty(), "{name}");
    }
}

#[test]
fn save_then_load() {
    for (name, store) in backends() {
        store.save(&FormType::course(), &course_fields()).unwrap();
        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 1, "{name}");
        assert_eq!(all[&FormType::course()], course_fields(), "{name}");
    }
}

#[test]
fn save_replaces_previous_list() {
    for (name, store) in backends() {
        store.save(&FormType::course(), &course_fields()).unwrap();
        store.save(&FormType::course(), &course_fields()[..1]).unwrap();
        let all = store.load_all().unwrap();
        assert_eq!(all[&FormType::course()].len(), 1, "{name}");
    }
}

#[test]
fn empty_list_is_remembered_as_configured() {
    for (name, store) in backends() {
        store.save(&FormType::branch(), &[]).unwrap();
        let all = store.load_all().unwrap();
        assert_eq!(all.get(&FormType::branch()), Some(&Vec::new()), "{name}");
    }
}

#[test]
fn sqlite_schema_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("formstack.db");
    SqliteStore::open(&path)
        .unwrap()
        .save(&FormType::exam_result(), &course_fields())
        .unwrap();

    let all = SqliteStore::open(&path).unwrap().load_all().unwrap();
    assert_eq!(all[&FormType::exam_result()], course_fields());
}
