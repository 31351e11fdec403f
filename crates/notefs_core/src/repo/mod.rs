//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the flat entry-store contract the hierarchy engine builds on.
//! - Isolate SQLite query and transaction details from orchestration code.
//!
//! # Invariants
//! - Batch mutations commit all-or-nothing; a failed write transaction
//!   leaves the store untouched.
//! - Absent keys are valid empty results, not errors.

pub mod entry_repo;
