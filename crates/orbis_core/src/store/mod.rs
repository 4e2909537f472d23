//! Opaque key-value persistence for dashboard state.
//!
//! # Responsibility
//! - Define the storage contract the dashboard saves to and restores from.
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - Values are opaque strings; the store never interprets them.
//! - `apply` is atomic: every put and remove of a batch lands, or none does.
//! - Keys are non-blank; a batch with a blank key is rejected before any write.

use crate::collection::CollectionError;
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const PROFILE_KEY: &str = "orbis_profile";
pub const TASKS_KEY: &str = "orbis_tasks";
pub const HABITS_KEY: &str = "orbis_habits";
pub const FINANCES_KEY: &str = "orbis_finances";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialization {
        key: String,
        source: serde_json::Error,
    },
    /// Stored data decoded but violates a core invariant.
    InvalidData {
        key: String,
        source: CollectionError,
    },
    /// Store key is blank.
    InvalidKey,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization { key, source } => {
                write!(f, "failed to (de)serialize `{key}`: {source}")
            }
            Self::InvalidData { key, source } => {
                write!(f, "invalid stored data under `{key}`: {source}")
            }
            Self::InvalidKey => f.write_str("store key cannot be empty"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization { source, .. } => Some(source),
            Self::InvalidData { source, .. } => Some(source),
            Self::InvalidKey => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One write in an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp<'a> {
    Put { key: &'a str, value: String },
    /// Removing a missing key is not an error.
    Remove { key: &'a str },
}

impl StoreOp<'_> {
    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Remove { key } => key,
        }
    }
}

fn check_keys(ops: &[StoreOp<'_>]) -> StoreResult<()> {
    if ops.iter().any(|op| op.key().trim().is_empty()) {
        return Err(StoreError::InvalidKey);
    }
    Ok(())
}

/// Storage medium for serialized dashboard state.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Applies `ops` in order, atomically: either all take effect or none.
    fn apply(&self, ops: &[StoreOp<'_>]) -> StoreResult<()>;

    fn put_all(&self, entries: &[(&str, String)]) -> StoreResult<()> {
        let ops: Vec<StoreOp<'_>> = entries
            .iter()
            .map(|(key, value)| StoreOp::Put {
                key: *key,
                value: value.clone(),
            })
            .collect();
        self.apply(&ops)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.apply(&[StoreOp::Remove { key }])
    }
}

/// Process-local store, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn apply(&self, ops: &[StoreOp<'_>]) -> StoreResult<()> {
        check_keys(ops)?;
        let mut map = self.entries.borrow_mut();
        for op in ops {
            match op {
                StoreOp::Put { key, value } => {
                    map.insert((*key).to_string(), value.clone());
                }
                StoreOp::Remove { key } => {
                    map.remove(*key);
                }
            }
        }
        Ok(())
    }
}

/// SQLite-backed store over the `kv_entries` table.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Wraps a connection returned by `db::open_db` / `db::open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn apply(&self, ops: &[StoreOp<'_>]) -> StoreResult<()> {
        check_keys(ops)?;

        let tx = self.conn.unchecked_transaction()?;
        for op in ops {
            match op {
                StoreOp::Put { key, value } => {
                    tx.execute(
                        "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
                         ON CONFLICT(key) DO UPDATE SET
                            value = excluded.value,
                            updated_at = (strftime('%s', 'now') * 1000);",
                        params![key, value],
                    )?;
                }
                StoreOp::Remove { key } => {
                    tx.execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
