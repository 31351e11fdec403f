//! Hierarchy engine over the flat entry store.
//!
//! # Responsibility
//! - Derive notebook/note tree semantics from slash-delimited paths.
//! - Implement subtree-consistent create/delete/rename operations.
//!
//! # Invariants
//! - Subtree selection uses the anchored-prefix rule from `model::path`
//!   uniformly for delete and rename.
//! - Each mutating operation is atomic: it either fully applies or, on a
//!   storage failure, leaves the store exactly as before the call.
//! - Missing targets are successful no-ops, never errors; storage failures
//!   propagate unmodified with no retry.

use crate::model::entry::{Entry, NoteContent};
use crate::model::path::{is_in_subtree, rebase};
use crate::repo::entry_repo::{EntryRepository, RepoResult};
use log::{debug, info};

/// Hierarchy operations facade over an entry-store implementation.
pub struct HierarchyService<R: EntryRepository> {
    repo: R,
}

impl<R: EntryRepository> HierarchyService<R> {
    /// Creates a service using the provided entry store.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns whether an entry exists at exactly `path`.
    ///
    /// This is a point lookup; it does not treat `path` as existing merely
    /// because descendants of it exist.
    pub fn path_exists(&self, path: &str) -> RepoResult<bool> {
        Ok(self.repo.get_entry(path)?.is_some())
    }

    /// Gets one entry by exact path.
    pub fn get_entry(&self, path: &str) -> RepoResult<Option<Entry>> {
        self.repo.get_entry(path)
    }

    /// Returns a full snapshot of all stored entries.
    pub fn list_entries(&self) -> RepoResult<Vec<Entry>> {
        self.repo.list_entries()
    }

    /// Creates a notebook marker at `path`.
    ///
    /// Creation is idempotent: an existing entry at that exact path is
    /// silently overwritten. Callers needing exclusivity check
    /// [`path_exists`](Self::path_exists) first.
    pub fn create_notebook(&mut self, path: &str) -> RepoResult<()> {
        self.repo.put_entry(&Entry::notebook(path))?;
        info!("event=create_notebook module=hierarchy status=ok path={path}");
        Ok(())
    }

    /// Creates a note at `path`.
    ///
    /// When `content` is `None` the note starts as the default
    /// "Untitled Note" header document; caller-supplied content is stored
    /// verbatim.
    pub fn create_note(&mut self, path: &str, content: Option<NoteContent>) -> RepoResult<()> {
        let document = content.unwrap_or_else(NoteContent::untitled);
        self.repo.put_entries(&[Entry::note(path, document)])?;
        info!("event=create_note module=hierarchy status=ok path={path}");
        Ok(())
    }

    /// Bulk-upserts entries in one atomic write.
    pub fn save_entries(&mut self, entries: &[Entry]) -> RepoResult<()> {
        self.repo.put_entries(entries)?;
        debug!(
            "event=save_entries module=hierarchy status=ok count={}",
            entries.len()
        );
        Ok(())
    }

    /// Deletes the entry at `path` and every entry nested below it.
    ///
    /// The scan and the deletes run in one write transaction. Returns the
    /// number of entries removed; a missing subtree is a no-op returning 0.
    pub fn delete_item(&mut self, path: &str) -> RepoResult<usize> {
        let removed = self
            .repo
            .delete_matching(&|stored| is_in_subtree(stored, path))?;
        info!("event=delete_item module=hierarchy status=ok path={path} removed={removed}");
        Ok(removed)
    }

    /// Moves the subtree rooted at `old_path` to `new_path`.
    ///
    /// Every entry in the old subtree is rewritten with its leading prefix
    /// rebased onto `new_path`; content is carried over unchanged. Only the
    /// anchored prefix is substituted, so unrelated paths that contain
    /// `old_path` as a later segment are never touched. Selection uses a
    /// read pass; the delete-and-rewrite mutation itself is atomic.
    ///
    /// Returns the number of entries moved; a missing subtree is a no-op
    /// returning 0.
    pub fn rename_item(&mut self, old_path: &str, new_path: &str) -> RepoResult<usize> {
        let snapshot = self.repo.list_entries()?;

        let mut old_keys = Vec::new();
        let mut rebased = Vec::new();
        for entry in snapshot {
            if let Some(path) = rebase(&entry.path, old_path, new_path) {
                old_keys.push(entry.path);
                rebased.push(Entry {
                    path,
                    content: entry.content,
                });
            }
        }

        if old_keys.is_empty() {
            debug!("event=rename_item module=hierarchy status=noop old={old_path} new={new_path}");
            return Ok(0);
        }

        self.repo.replace_entries(&old_keys, &rebased)?;
        info!(
            "event=rename_item module=hierarchy status=ok old={old_path} new={new_path} moved={}",
            rebased.len()
        );
        Ok(rebased.len())
    }
}
