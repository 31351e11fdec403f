//! Path-hierarchy predicates.
//!
//! # Responsibility
//! - Decide subtree membership from flat slash-delimited keys.
//! - Rewrite the leading prefix of a path during rename.
//!
//! # Invariants
//! - Matching is anchored: `"foobar"` is never in the subtree of `"foo"`.
//! - `rebase` rewrites only the leading prefix, never internal occurrences
//!   of the old name, and only for paths that are in the old subtree.
//! - Both delete and rename must use the same membership rule, otherwise
//!   subtree closure breaks.

/// Returns whether `path` is `target` itself or nested below it.
///
/// The rule is `path == target || path.starts_with(target + "/")`; the
/// explicit separator check is what keeps similarly-prefixed siblings
/// (`"ab"` vs target `"a"`) out of the subtree.
pub fn is_in_subtree(path: &str, target: &str) -> bool {
    match path.strip_prefix(target) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Rewrites the leading `old` prefix of `path` to `new`.
///
/// Returns `None` when `path` is not in the `old` subtree, so callers can
/// use this as both the selection predicate and the rewrite in one pass.
pub fn rebase(path: &str, old: &str, new: &str) -> Option<String> {
    let rest = path.strip_prefix(old)?;
    if rest.is_empty() {
        return Some(new.to_string());
    }
    if rest.starts_with('/') {
        return Some(format!("{new}{rest}"));
    }
    None
}
