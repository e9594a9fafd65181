use clap::Parser;
use formstack_model::FormType;
use formstack_server::config::{Args, DEFAULT_MAX_BODY_BYTES, ServerConfig};
use std::path::PathBuf;

#[test]
fn paths_default_under_the_data_dir() {
    let config = ServerConfig::from(Args::parse_from(["formstack-server", "--data-dir", "/srv/forms"]));
    assert_eq!(config.bind.port(), 8080);
    assert_eq!(config.database_path, PathBuf::from("/srv/forms/formstack.db"));
    assert_eq!(config.uploads_dir, PathBuf::from("/srv/forms/uploads"));
    assert_eq!(config.upload_uri_prefix, "/uploads");
    assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    assert!(config.upload_slots.is_empty());
    assert!(!config.verbose);
}

#[test]
fn explicit_flags_win() {
    let config = ServerConfig::from(Args::parse_from([
        "formstack-server",
        "--port",
        "9000",
        "--host",
        "127.0.0.1",
        "--database",
        "/tmp/other.db",
        "--upload-slot",
        "avatar",
        "--upload-slot",
        "banner",
        "--max-body-bytes",
        "1024",
        "-v",
    ]));
    assert_eq!(config.bind.to_string(), "127.0.0.1:9000");
    assert_eq!(config.database_path, PathBuf::from("/tmp/other.db"));
    assert_eq!(config.upload_slots, vec!["avatar", "banner"]);
    assert_eq!(config.max_body_bytes, 1024);
    assert!(config.verbose);
}

#[test]
fn open_state_creates_storage_and_applies_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let defaults = dir.path().join("defaults.toml");
    std::fs::write(
        &defaults,
        "[[workshop]]\nid = \"w1\"\nname = \"poster\"\nlabel = \"Poster\"\ninputType = \"file\"\n",
    )
    .unwrap();

    let config = ServerConfig::from(Args::parse_from([
        "formstack-server".to_string(),
        "--data-dir".to_string(),
        dir.path().display().to_string(),
        "--defaults".to_string(),
        defaults.display().to_string(),
        "--upload-slot".to_string(),
        "poster".to_string(),
    ]));
    let state = config.open_state().unwrap();

    assert!(config.database_path.exists());
    assert!(config.uploads_dir.is_dir());
    let workshop = state
        .records()
        .registry()
        .get_fields(&FormType::new("workshop").unwrap());
    assert_eq!(workshop[0].name, "poster");
}

#[test]
fn open_state_rejects_defaults_with_unknown_slots() {
    let dir = tempfile::tempdir().unwrap();
    let defaults = dir.path().join("defaults.toml");
    std::fs::write(
        &defaults,
        "[[workshop]]\nid = \"w1\"\nname = \"poster\"\nlabel = \"Poster\"\ninputType = \"file\"\n",
    )
    .unwrap();

    let config = ServerConfig::from(Args::parse_from([
        "formstack-server".to_string(),
        "--data-dir".to_string(),
        dir.path().display().to_string(),
        "--defaults".to_string(),
        defaults.display().to_string(),
    ]));
    assert!(config.open_state().is_err());
}
