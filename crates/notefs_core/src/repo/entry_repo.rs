//! Entry store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide point/bulk access to the flat path-keyed entry table.
//! - Own write-transaction scoping for multi-statement mutations.
//!
//! # Invariants
//! - `put` semantics are insert-or-overwrite; path uniqueness is enforced
//!   by the primary key, never by application checks.
//! - Every batch operation runs inside one IMMEDIATE write transaction and
//!   commits all-or-nothing.
//! - Deleting an absent path is a no-op, not an error.

use crate::db::DbError;
use crate::model::entry::{Entry, NoteContent};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from entry persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// The backing engine failed outside a write scope (storage unavailable
    /// or a statement/read failure).
    Db(DbError),
    /// The engine failed while a write transaction was open, or the commit
    /// itself failed; rollback is guaranteed and the caller must assume no
    /// mutation took effect.
    TransactionAborted(DbError),
    /// Persisted content cannot be decoded into a valid document.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::TransactionAborted(err) => write!(f, "write transaction aborted: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted entry data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::TransactionAborted(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl RepoError {
    /// Reclassifies an engine failure as a transaction abort. Used when the
    /// failure happened inside an open write scope, where rollback is the
    /// guaranteed outcome; non-engine errors pass through unchanged.
    fn into_abort(self) -> Self {
        match self {
            Self::Db(err) => Self::TransactionAborted(err),
            other => other,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Flat entry-store contract required by the hierarchy engine.
///
/// Implementations own transaction scoping: the batch operations
/// (`put_entries`, `delete_matching`, `replace_entries`) must be atomic.
pub trait EntryRepository {
    /// Point read. Absent paths return `Ok(None)`.
    fn get_entry(&self, path: &str) -> RepoResult<Option<Entry>>;
    /// Full snapshot of every stored entry.
    fn list_entries(&self) -> RepoResult<Vec<Entry>>;
    /// Inserts or overwrites one entry.
    fn put_entry(&mut self, entry: &Entry) -> RepoResult<()>;
    /// Inserts or overwrites many entries in one write transaction.
    fn put_entries(&mut self, entries: &[Entry]) -> RepoResult<()>;
    /// Removes the entry at exactly `path`; absent paths are a no-op.
    fn delete_entry(&mut self, path: &str) -> RepoResult<()>;
    /// Scans all stored paths and deletes those matched by `matches`, in
    /// one write transaction. Returns the number of entries removed.
    fn delete_matching(&mut self, matches: &dyn Fn(&str) -> bool) -> RepoResult<usize>;
    /// Deletes `remove` keys and upserts `insert` entries in one write
    /// transaction. Old keys are removed before new entries are written so
    /// overlapping key sets behave like a move.
    fn replace_entries(&mut self, remove: &[String], insert: &[Entry]) -> RepoResult<()>;
}

/// SQLite-backed entry store.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Constructs a store over a migrated/ready connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Runs `body` inside one IMMEDIATE write transaction.
    ///
    /// The transaction commits only if `body` returns `Ok`; any failure in
    /// `body` rolls back every statement it issued. Engine failures inside
    /// the open scope, and a failed commit, surface as
    /// `RepoError::TransactionAborted`.
    pub fn with_write_tx<T>(
        &mut self,
        body: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        // Dropping `tx` on the error path rolls back before the error is
        // reported upward.
        let value = body(&tx).map_err(RepoError::into_abort)?;
        tx.commit()
            .map_err(|err| RepoError::TransactionAborted(DbError::Sqlite(err)))?;
        Ok(value)
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn get_entry(&self, path: &str) -> RepoResult<Option<Entry>> {
        let row = self
            .conn
            .query_row(
                "SELECT path, content FROM entries WHERE path = ?1;",
                [path],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)),
            )
            .optional()?;

        row.map(|(path, raw)| decode_entry(path, raw)).transpose()
    }

    fn list_entries(&self) -> RepoResult<Vec<Entry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, content FROM entries ORDER BY path ASC;")?;
        let mut rows = stmt.query([])?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let path: String = row.get(0)?;
            let raw: Option<String> = row.get(1)?;
            entries.push(decode_entry(path, raw)?);
        }

        Ok(entries)
    }

    fn put_entry(&mut self, entry: &Entry) -> RepoResult<()> {
        let encoded = encode_content(entry.content.as_ref())?;
        self.conn.execute(
            "INSERT OR REPLACE INTO entries (path, content) VALUES (?1, ?2);",
            params![entry.path, encoded],
        )?;
        Ok(())
    }

    fn put_entries(&mut self, entries: &[Entry]) -> RepoResult<()> {
        self.with_write_tx(|tx| {
            for entry in entries {
                put_in_tx(tx, entry)?;
            }
            Ok(())
        })
    }

    fn delete_entry(&mut self, path: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM entries WHERE path = ?1;", [path])?;
        Ok(())
    }

    fn delete_matching(&mut self, matches: &dyn Fn(&str) -> bool) -> RepoResult<usize> {
        self.with_write_tx(|tx| {
            let mut stmt = tx.prepare("SELECT path FROM entries;")?;
            let mut rows = stmt.query([])?;
            let mut selected = Vec::new();
            while let Some(row) = rows.next()? {
                let path: String = row.get(0)?;
                if matches(&path) {
                    selected.push(path);
                }
            }
            drop(rows);
            drop(stmt);

            let mut removed = 0;
            for path in &selected {
                removed += tx.execute("DELETE FROM entries WHERE path = ?1;", [path.as_str()])?;
            }
            Ok(removed)
        })
    }

    fn replace_entries(&mut self, remove: &[String], insert: &[Entry]) -> RepoResult<()> {
        self.with_write_tx(|tx| {
            for path in remove {
                tx.execute("DELETE FROM entries WHERE path = ?1;", [path.as_str()])?;
            }
            for entry in insert {
                put_in_tx(tx, entry)?;
            }
            Ok(())
        })
    }
}

fn put_in_tx(tx: &Transaction<'_>, entry: &Entry) -> RepoResult<()> {
    let encoded = encode_content(entry.content.as_ref())?;
    tx.execute(
        "INSERT OR REPLACE INTO entries (path, content) VALUES (?1, ?2);",
        params![entry.path, encoded],
    )?;
    Ok(())
}

fn encode_content(content: Option<&NoteContent>) -> RepoResult<Option<String>> {
    content
        .map(|document| {
            serde_json::to_string(document)
                .map_err(|err| RepoError::InvalidData(format!("content not serializable: {err}")))
        })
        .transpose()
}

fn decode_entry(path: String, raw: Option<String>) -> RepoResult<Entry> {
    let content = raw
        .map(|text| {
            serde_json::from_str::<NoteContent>(&text).map_err(|err| {
                RepoError::InvalidData(format!("content for `{path}` not decodable: {err}"))
            })
        })
        .transpose()?;

    Ok(Entry { path, content })
}
