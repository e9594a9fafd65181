//! Command-line configuration and service wiring.

use anyhow::{Context, Result};
use clap::Parser;
use formstack_blobstore::FsBlobStore;
use formstack_engine::{DefaultFields, FieldRegistry, FileSlotRouter, RecordStore};
use formstack_storage::SqliteStore;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::AppState;

/// Largest request body accepted by default (25 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Parser, Debug, Clone)]
#[command(name = "formstack-server")]
#[command(about = "Dynamic form records over HTTP")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Directory for the database and uploads when their paths are not given
    #[arg(short, long, default_value = "formstack-data")]
    pub data_dir: PathBuf,

    /// SQLite database file [default: <data-dir>/formstack.db]
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Directory uploaded files are written to [default: <data-dir>/uploads]
    #[arg(long)]
    pub uploads_dir: Option<PathBuf>,

    /// Prefix of the URIs stored for uploaded files
    #[arg(long, default_value = "/uploads")]
    pub upload_uri_prefix: String,

    /// TOML file with default field lists, overriding the built-in ones
    #[arg(long)]
    pub defaults: Option<PathBuf>,

    /// Extra upload slot to accept on create (repeatable)
    #[arg(long = "upload-slot", value_name = "SLOT")]
    pub upload_slots: Vec<String>,

    /// Largest accepted request body in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database_path: PathBuf,
    pub uploads_dir: PathBuf,
    pub upload_uri_prefix: String,
    pub defaults_file: Option<PathBuf>,
    pub upload_slots: Vec<String>,
    pub max_body_bytes: usize,
    pub verbose: bool,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            bind: SocketAddr::new(args.host, args.port),
            database_path: args
                .database
                .unwrap_or_else(|| args.data_dir.join("formstack.db")),
            uploads_dir: args
                .uploads_dir
                .unwrap_or_else(|| args.data_dir.join("uploads")),
            upload_uri_prefix: args.upload_uri_prefix,
            defaults_file: args.defaults,
            upload_slots: args.upload_slots,
            max_body_bytes: args.max_body_bytes,
            verbose: args.verbose,
        }
    }
}

impl ServerConfig {
    /// Opens the database and upload directory and loads the field registry.
    pub fn open_state(&self) -> Result<AppState> {
        let database = Arc::new(SqliteStore::open(&self.database_path).with_context(|| {
            format!("Failed to open database {}", self.database_path.display())
        })?);
        let blobs = Arc::new(
            FsBlobStore::open(&self.uploads_dir, &self.upload_uri_prefix).with_context(|| {
                format!("Failed to open upload directory {}", self.uploads_dir.display())
            })?,
        );

        let mut router = FileSlotRouter::with_default_slots();
        for slot in &self.upload_slots {
            router.register(slot);
        }

        let mut defaults = DefaultFields::builtin();
        if let Some(path) = &self.defaults_file {
            let overrides = DefaultFields::load_toml(path)
                .with_context(|| format!("Failed to load default fields from {}", path.display()))?;
            defaults = defaults.overridden_by(overrides);
        }

        let registry = FieldRegistry::load(database.clone(), defaults, Arc::new(router))
            .context("Failed to load field configuration")?;
        info!(
            "Database: {}, uploads: {}",
            self.database_path.display(),
            self.uploads_dir.display()
        );

        let records = RecordStore::new(database, blobs, Arc::new(registry));
        Ok(AppState::new(records).with_max_body_bytes(self.max_body_bytes))
    }
}
