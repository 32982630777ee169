use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;

use crate::db::migrations::run_migrations;

/// Handle to the progress database.
///
/// The engine runs on a single cooperative thread, so calls go straight to
/// the connection; there is no worker to bridge to.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open SQLite database {}", db_path.display()))?;
        Self::initialize(conn, db_path)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::initialize(conn, PathBuf::from(":memory:"))
    }

    fn initialize(mut conn: Connection, db_path: PathBuf) -> Result<Self> {
        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            error!("failed to enable WAL mode: {err}");
        }
        if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
            error!("failed to enable foreign keys: {err}");
        }

        run_migrations(&mut conn).context("failed to run database migrations")?;
        info!("database initialized at {}", db_path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Run a task against the connection.
    pub fn with_conn<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database lock poisoned"))?;
        task(&mut guard)
    }
}
