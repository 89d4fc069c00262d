//! SQLite storage backend.
//!
//! One file on disk, two tables. Each record is stored as a JSON payload
//! keyed by id, with the columns a secondary index needs (`name`,
//! `debtor_id`, `date`) extracted alongside. Keeping the payload opaque is
//! what lets legacy and canonical transaction shapes share a table without
//! a migration: the schema upgrade path only ever creates missing tables
//! and indexes, it never rewrites a row it did not author.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::OnceCell;
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use super::traits::StoreGateway;
use super::types::{Client, Collection, RawEntry};
use crate::error::{Result, TallyError};

/// Logical schema version, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    id      TEXT PRIMARY KEY,
    name    TEXT NOT NULL DEFAULT '',
    payload TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS clients_name ON clients (name);

CREATE TABLE IF NOT EXISTS transactions (
    id        TEXT PRIMARY KEY,
    debtor_id TEXT NOT NULL DEFAULT '',
    date      TEXT,
    payload   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS transactions_debtor ON transactions (debtor_id);
CREATE INDEX IF NOT EXISTS transactions_date   ON transactions (date);
"#;

enum Location {
    Disk(PathBuf),
    Memory,
}

/// SQLite-backed [`StoreGateway`].
///
/// Opening is lazy and idempotent: the first operation of any kind
/// initializes the connection and runs the additive schema batch; every
/// later operation reuses the same handle.
pub struct SqliteStore {
    location: Location,
    conn: OnceCell<Mutex<Connection>>,
}

impl SqliteStore {
    /// Create a store backed by a file at `path`. Nothing is opened yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::Disk(path.into()),
            conn: OnceCell::new(),
        }
    }

    /// Create a store backed by an in-memory database (tests, dry runs).
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            conn: OnceCell::new(),
        }
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::Disk(path) => Some(path),
            Location::Memory => None,
        }
    }

    fn handle(&self) -> Result<&Mutex<Connection>> {
        self.conn.get_or_try_init(|| {
            let conn = match &self.location {
                Location::Disk(path) => {
                    if let Some(parent) = path.parent() {
                        if !parent.as_os_str().is_empty() {
                            fs::create_dir_all(parent).map_err(|e| {
                                TallyError::StoreUnavailable(format!(
                                    "cannot create store directory {}: {}",
                                    parent.display(),
                                    e
                                ))
                            })?;
                        }
                    }
                    debug!(path = %path.display(), "opening store");
                    Connection::open(path).map_err(|e| {
                        TallyError::StoreUnavailable(format!(
                            "cannot open store at {}: {}",
                            path.display(),
                            e
                        ))
                    })?
                }
                Location::Memory => Connection::open_in_memory()?,
            };
            initialize_schema(&conn)?;
            Ok(Mutex::new(conn))
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        Ok(self
            .handle()?
            .lock()
            .unwrap_or_else(PoisonError::into_inner))
    }
}

/// Run the additive-only schema batch and raise the stored version.
///
/// Existing tables and indexes are left untouched (`IF NOT EXISTS`
/// throughout), so data written under an older logical version survives a
/// newer binary opening the file.
fn initialize_schema(conn: &Connection) -> Result<()> {
    let on_disk: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    conn.execute_batch(SCHEMA_SQL)?;
    if on_disk < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        info!(from = on_disk, to = SCHEMA_VERSION, "store schema upgraded");
    }
    Ok(())
}

fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(TallyError::Validation(
            "record id must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl StoreGateway for SqliteStore {
    fn read_clients(&self) -> Result<Vec<Client>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT payload FROM clients")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut clients = Vec::new();
        for row in rows {
            let payload = row?;
            match serde_json::from_str::<Client>(&payload) {
                Ok(client) => clients.push(client),
                Err(error) => {
                    warn!(collection = Collection::Clients.table(), %error,
                        "skipping unreadable record");
                }
            }
        }
        Ok(clients)
    }

    fn read_entries(&self) -> Result<Vec<RawEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT payload FROM transactions")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut entries = Vec::new();
        for row in rows {
            let payload = row?;
            match serde_json::from_str::<RawEntry>(&payload) {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    warn!(collection = Collection::Transactions.table(), %error,
                        "skipping unreadable record");
                }
            }
        }
        Ok(entries)
    }

    fn upsert_client(&self, client: &Client) -> Result<()> {
        require_id(&client.id)?;
        let payload = serde_json::to_string(client)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO clients (id, name, payload) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, payload = excluded.payload",
            params![client.id, client.name, payload],
        )?;
        Ok(())
    }

    fn upsert_entry(&self, entry: &RawEntry) -> Result<()> {
        require_id(&entry.id)?;
        let payload = serde_json::to_string(entry)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO transactions (id, debtor_id, date, payload) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET debtor_id = excluded.debtor_id,
                 date = excluded.date, payload = excluded.payload",
            params![entry.id, entry.debtor_id, entry.date, payload],
        )?;
        Ok(())
    }

    fn delete_client(&self, id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM clients WHERE id = ?1", [id])?;
        Ok(())
    }

    fn delete_entry(&self, id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
        Ok(())
    }
}
