//! Schema migration registry for the entries database.
//!
//! # Responsibility
//! - Embed versioned SQL scripts and apply the pending ones in order.
//! - Stamp the applied version into SQLite's `PRAGMA user_version` so
//!   first-open schema creation happens exactly once per store lifetime.
//!
//! # Invariants
//! - Registry versions are strictly increasing.
//! - All pending scripts apply inside one transaction; a database is never
//!   left between versions.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Latest schema version this binary can produce.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the connection's schema up to [`latest_version`].
///
/// A database stamped with a version newer than this binary knows is
/// rejected with `UnsupportedSchemaVersion` instead of being guessed at.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stamped: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();

    if stamped > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stamped,
            latest_supported: latest,
        });
    }
    if stamped == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > stamped) {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}
