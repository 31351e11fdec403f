//! Core storage logic for NoteFS.
//! This crate is the single source of truth for path-hierarchy invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{Block, Entry, NoteContent};
pub use model::path::{is_in_subtree, rebase};
pub use repo::entry_repo::{EntryRepository, RepoError, RepoResult, SqliteEntryRepository};
pub use service::hierarchy_service::HierarchyService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
