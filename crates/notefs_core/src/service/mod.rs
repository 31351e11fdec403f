//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate entry-store calls into hierarchy-level operations.
//! - Keep callers decoupled from storage and transaction details.

pub mod hierarchy_service;
