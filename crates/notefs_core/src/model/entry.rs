//! Entry domain model.
//!
//! # Responsibility
//! - Define the single persisted record shared by notebooks and notes.
//! - Provide constructors for the two entry roles.
//!
//! # Invariants
//! - `path` is the unique key; no two entries share one.
//! - `content` is `None` exactly when the entry is a notebook marker.
//! - Block content is opaque to core: stored and returned verbatim.

use serde::{Deserialize, Serialize};

/// One content block inside a note document.
///
/// Core never interprets blocks; `data` stays arbitrary JSON so the editor
/// can evolve block shapes without schema changes here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block kind, serialized as `type` to match the editor document format.
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific payload.
    pub data: serde_json::Value,
}

/// Structured note document: an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteContent {
    pub blocks: Vec<Block>,
}

impl NoteContent {
    /// Default document for a freshly created note: one level-2 header
    /// titled "Untitled Note".
    pub fn untitled() -> Self {
        Self {
            blocks: vec![Block {
                kind: "header".to_string(),
                data: serde_json::json!({ "text": "Untitled Note", "level": 2 }),
            }],
        }
    }
}

/// Canonical persisted record for both notebooks and notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique slash-delimited key, e.g. `"notebookA/noteB"`.
    pub path: String,
    /// `Some` for notes, `None` for notebook markers.
    pub content: Option<NoteContent>,
}

impl Entry {
    /// Creates a notebook marker entry. The entry carries no content; it
    /// exists purely to mark `path` as a valid container.
    pub fn notebook(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }

    /// Creates a note entry with the given document.
    pub fn note(path: impl Into<String>, content: NoteContent) -> Self {
        Self {
            path: path.into(),
            content: Some(content),
        }
    }

    /// Returns whether this entry is a notebook marker.
    pub fn is_notebook(&self) -> bool {
        self.content.is_none()
    }
}
