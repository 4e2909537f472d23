//! SQLite backing for the dashboard key-value store.
//!
//! # Responsibility
//! - Open connections whose schema carries the `kv_entries` table.
//! - Own the kv schema: its migrations and the post-migration table check.
//!
//! # Invariants
//! - `PRAGMA user_version` is the version of the last applied kv migration.
//! - A returned connection holds every table its schema version promises. A
//!   file that claims a known version without those tables is rejected, never
//!   silently repaired.
//! - `kv_entries.key` is non-blank at the schema level too (CHECK constraint).

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Table backing `store::SqliteKvStore`.
pub const KV_TABLE: &str = "kv_entries";

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was migrated by a newer binary.
    SchemaTooNew { found: u32, supported: u32 },
    /// `user_version` promises a table the file does not contain.
    MissingTable { table: &'static str, version: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "kv store schema version {found} is newer than supported {supported}"
            ),
            Self::MissingTable { table, version } => write!(
                f,
                "kv store claims schema version {version} but table `{table}` is missing"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } | Self::MissingTable { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
