//! Versioned kv store schema.
//!
//! # Invariants
//! - Each migration names the tables it creates; after migrating, every
//!   table promised up to the current version must exist.
//! - Pending migrations run in one transaction, so a failure leaves the
//!   file at its previous version.

use crate::db::{DbError, DbResult, KV_TABLE};
use log::{info, warn};
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
    tables: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "kv_entries",
    sql: include_str!("0001_kv_entries.sql"),
    tables: &[KV_TABLE],
}];

/// Schema version written by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the kv schema up to [`latest_version`] and verifies its tables.
///
/// Returns how many migrations were applied.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        warn!(
            "event=db_migrate module=db status=rejected found={} supported={}",
            found, supported
        );
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > found)
        .collect();
    if !pending.is_empty() {
        let tx = conn.transaction()?;
        for migration in &pending {
            tx.execute_batch(migration.sql)?;
            tx.pragma_update(None, "user_version", migration.version)?;
            info!(
                "event=db_migrate module=db status=ok version={} name={}",
                migration.version, migration.name
            );
        }
        tx.commit()?;
    }

    verify_tables(conn, supported)?;
    Ok(pending.len())
}

fn verify_tables(conn: &Connection, version: u32) -> DbResult<()> {
    for migration in MIGRATIONS.iter().filter(|m| m.version <= version) {
        for &table in migration.tables {
            if !table_exists(conn, table)? {
                return Err(DbError::MissingTable {
                    table,
                    version: migration.version,
                });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [table],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
