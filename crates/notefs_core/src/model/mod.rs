//! Domain model for the path-keyed entry store.
//!
//! # Responsibility
//! - Define the canonical persisted record (`Entry`) and its content shape.
//! - Own the path-prefix rules that derive tree structure from flat keys.
//!
//! # Invariants
//! - Every entry is identified by a unique slash-delimited `path`.
//! - Tree structure exists only as anchored path prefixes; nothing else is
//!   stored about the hierarchy.

pub mod entry;
pub mod path;
