use notefs_core::db::{open_db_in_memory, DbError};
use notefs_core::{
    Block, Entry, EntryRepository, HierarchyService, NoteContent, RepoError, RepoResult,
    SqliteEntryRepository,
};
use rusqlite::Connection;

fn service(conn: &mut Connection) -> HierarchyService<SqliteEntryRepository<'_>> {
    HierarchyService::new(SqliteEntryRepository::new(conn))
}

fn stored_paths<R: EntryRepository>(service: &HierarchyService<R>) -> Vec<String> {
    service
        .list_entries()
        .unwrap()
        .into_iter()
        .map(|entry| entry.path)
        .collect()
}

#[test]
fn notebook_exists_after_creation_but_children_do_not() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    service.create_notebook("nb").unwrap();

    assert!(service.path_exists("nb").unwrap());
    assert!(!service.path_exists("nb/x").unwrap());
}

#[test]
fn create_notebook_overwrites_existing_entry_at_same_path() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    service.create_note("nb", None).unwrap();
    service.create_notebook("nb").unwrap();

    let entry = service.get_entry("nb").unwrap().unwrap();
    assert!(entry.is_notebook());
    assert_eq!(stored_paths(&service), vec!["nb"]);
}

#[test]
fn create_note_without_content_uses_untitled_header() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    service.create_note("nb/n1", None).unwrap();

    let entry = service.get_entry("nb/n1").unwrap().unwrap();
    let content = entry.content.unwrap();
    assert_eq!(content.blocks.len(), 1);
    assert_eq!(content.blocks[0].kind, "header");
    assert_eq!(content.blocks[0].data["text"], "Untitled Note");
    assert_eq!(content.blocks[0].data["level"], 2);
}

#[test]
fn create_note_with_content_stores_it_verbatim() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let content = NoteContent {
        blocks: vec![Block {
            kind: "text".to_string(),
            data: serde_json::json!({ "text": "hi" }),
        }],
    };
    service.create_note("nb/n2", Some(content.clone())).unwrap();

    let entry = service.get_entry("nb/n2").unwrap().unwrap();
    assert_eq!(entry.content.unwrap(), content);
}

#[test]
fn delete_item_removes_exactly_the_anchored_subtree() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    for path in ["a", "a/b", "a/bc", "ab"] {
        service.create_notebook(path).unwrap();
    }

    let removed = service.delete_item("a").unwrap();

    assert_eq!(removed, 2);
    assert_eq!(stored_paths(&service), vec!["a/bc", "ab"]);
}

#[test]
fn delete_item_on_missing_path_is_a_noop() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    service.create_notebook("a").unwrap();

    let removed = service.delete_item("nonexistent").unwrap();

    assert_eq!(removed, 0);
    assert_eq!(stored_paths(&service), vec!["a"]);
}

#[test]
fn rename_item_moves_the_whole_subtree() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    service.create_notebook("a").unwrap();
    service.create_note("a/b", None).unwrap();

    let moved = service.rename_item("a", "x").unwrap();

    assert_eq!(moved, 2);
    assert_eq!(stored_paths(&service), vec!["x", "x/b"]);
}

#[test]
fn rename_item_preserves_content_unchanged() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let content = NoteContent {
        blocks: vec![Block {
            kind: "text".to_string(),
            data: serde_json::json!({ "text": "payload" }),
        }],
    };
    service.create_note("a/note", Some(content.clone())).unwrap();

    service.rename_item("a", "z").unwrap();

    let entry = service.get_entry("z/note").unwrap().unwrap();
    assert_eq!(entry.content.unwrap(), content);
    assert!(service.get_entry("a/note").unwrap().is_none());
}

#[test]
fn rename_item_leaves_similarly_prefixed_siblings_alone() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    for path in ["a", "a/b", "ab", "b/a"] {
        service.create_notebook(path).unwrap();
    }

    let moved = service.rename_item("a", "z").unwrap();

    assert_eq!(moved, 2);
    assert_eq!(stored_paths(&service), vec!["ab", "b/a", "z", "z/b"]);
}

#[test]
fn rename_item_rewrites_only_the_leading_prefix() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    // "a" appears again as an inner segment; only the anchored prefix moves.
    service.create_notebook("a").unwrap();
    service.create_notebook("a/x/a").unwrap();

    service.rename_item("a", "z").unwrap();

    assert_eq!(stored_paths(&service), vec!["z", "z/x/a"]);
}

#[test]
fn rename_item_on_missing_path_is_a_noop() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    service.create_notebook("a").unwrap();

    let moved = service.rename_item("nonexistent", "y").unwrap();

    assert_eq!(moved, 0);
    assert_eq!(stored_paths(&service), vec!["a"]);
}

#[test]
fn save_entries_bulk_upserts_in_one_call() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    service.create_note("nb/n1", None).unwrap();
    service
        .save_entries(&[
            Entry::notebook("nb"),
            Entry::note(
                "nb/n1",
                NoteContent {
                    blocks: vec![Block {
                        kind: "text".to_string(),
                        data: serde_json::json!({ "text": "replaced" }),
                    }],
                },
            ),
        ])
        .unwrap();

    assert_eq!(stored_paths(&service), vec!["nb", "nb/n1"]);
    let entry = service.get_entry("nb/n1").unwrap().unwrap();
    assert_eq!(entry.content.unwrap().blocks[0].data["text"], "replaced");
}

/// In-memory store whose batch mutation always aborts, honoring the
/// contract that an aborted write leaves storage untouched. Reads and
/// point writes behave normally.
struct AbortingStore {
    entries: Vec<Entry>,
}

impl AbortingStore {
    fn abort<T>() -> RepoResult<T> {
        Err(RepoError::TransactionAborted(DbError::Sqlite(
            rusqlite::Error::QueryReturnedNoRows,
        )))
    }
}

impl EntryRepository for AbortingStore {
    fn get_entry(&self, path: &str) -> RepoResult<Option<Entry>> {
        Ok(self.entries.iter().find(|e| e.path == path).cloned())
    }

    fn list_entries(&self) -> RepoResult<Vec<Entry>> {
        Ok(self.entries.clone())
    }

    fn put_entry(&mut self, entry: &Entry) -> RepoResult<()> {
        self.entries.retain(|e| e.path != entry.path);
        self.entries.push(entry.clone());
        Ok(())
    }

    fn put_entries(&mut self, entries: &[Entry]) -> RepoResult<()> {
        for entry in entries {
            self.put_entry(entry)?;
        }
        Ok(())
    }

    fn delete_entry(&mut self, path: &str) -> RepoResult<()> {
        self.entries.retain(|e| e.path != path);
        Ok(())
    }

    fn delete_matching(&mut self, _matches: &dyn Fn(&str) -> bool) -> RepoResult<usize> {
        Self::abort()
    }

    fn replace_entries(&mut self, _remove: &[String], _insert: &[Entry]) -> RepoResult<()> {
        Self::abort()
    }
}

#[test]
fn rename_item_applies_no_partial_writes_when_mutation_aborts() {
    let store = AbortingStore {
        entries: vec![Entry::notebook("a"), Entry::note("a/b", NoteContent::untitled())],
    };
    let mut service = HierarchyService::new(store);

    let err = service.rename_item("a", "x").unwrap_err();
    assert!(matches!(err, RepoError::TransactionAborted(_)));

    // All rename mutation flows through the one atomic replace call, so a
    // failed rename must leave the pre-rename subtree fully intact.
    assert_eq!(stored_paths(&service), vec!["a", "a/b"]);
    assert!(service.get_entry("x").unwrap().is_none());
}

#[test]
fn delete_item_applies_no_partial_writes_when_mutation_aborts() {
    let store = AbortingStore {
        entries: vec![Entry::notebook("a"), Entry::notebook("a/b")],
    };
    let mut service = HierarchyService::new(store);

    let err = service.delete_item("a").unwrap_err();
    assert!(matches!(err, RepoError::TransactionAborted(_)));
    assert_eq!(stored_paths(&service), vec!["a", "a/b"]);
}

#[test]
fn aborted_rename_leaves_pre_rename_state_intact() {
    let mut conn = open_db_in_memory().unwrap();

    {
        let mut service = service(&mut conn);
        service.create_notebook("a").unwrap();
        service.create_note("a/b", None).unwrap();
    }

    // Simulate an engine-level abort mid-mutation: the same delete-then-put
    // sequence rename uses, failed before commit.
    {
        let mut repo = SqliteEntryRepository::new(&mut conn);
        let err = repo
            .with_write_tx(|tx| {
                tx.execute("DELETE FROM entries WHERE path = 'a';", [])?;
                tx.execute(
                    "INSERT OR REPLACE INTO entries (path, content) VALUES ('x', NULL);",
                    [],
                )?;
                Err::<(), _>(RepoError::InvalidData("simulated abort".to_string()))
            })
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    let service = service(&mut conn);
    assert_eq!(stored_paths(&service), vec!["a", "a/b"]);
}
