//! Archive listing and directory-tree construction for ziptree
//!
//! This crate turns the entry list of a ZIP archive into a rooted tree of
//! directory and file nodes, and renders that tree as JSON for a client to draw.
//!
//! # Features
//!
//! - **Listing**: Read entry names from a ZIP central directory without extracting
//! - **Tree building**: Deduplicate shared path prefixes, keep first-seen order
//! - **JSON output**: Fixed field order, `serde_json` string escaping, no whitespace
//!
//! # Usage
//!
//! ```
//! use ziptree_archive::{build_tree_from_entries, tree_to_json, RolePolicy};
//!
//! let tree = build_tree_from_entries(["a/", "a/b.txt", "d.txt"], RolePolicy::default());
//! let json = tree_to_json(&tree).unwrap();
//! assert!(json.starts_with(r#"{"name":"","path":"","isDirectory":true"#));
//! ```
//!
//! ## From a ZIP file on disk
//!
//! ```no_run
//! use ziptree_archive::{parse_zip_tree, tree_to_json, RolePolicy, ZipLister};
//! use std::path::Path;
//!
//! let tree = parse_zip_tree(&ZipLister, Path::new("archive.zip"), RolePolicy::default()).unwrap();
//! println!("{}", tree_to_json(&tree).unwrap());
//! ```

pub mod error;
pub mod json;
pub mod listing;
pub mod tree;

use std::path::Path;

pub use error::ArchiveError;
pub use json::{node_to_json, tree_to_json};
pub use listing::{list_zip_entries, ArchiveLister, ZipLister};
pub use tree::{NodeId, PathTree, RolePolicy, TreeNode};

/// Build a tree from entry names in listing order.
///
/// Explicit directory markers (`dir/`) are stripped to their bare path; a marker
/// that strips to nothing is dropped.
pub fn build_tree_from_entries<I, S>(entries: I, policy: RolePolicy) -> PathTree
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tree = PathTree::with_policy(policy);
    for entry in entries {
        tree.add_entry(entry.as_ref());
    }
    tree
}

/// List the archive at `path` with `lister` and build its tree
///
/// # Errors
///
/// Propagates the `ArchiveError` reported by `lister`.
pub fn parse_zip_tree(
    lister: &dyn ArchiveLister,
    path: &Path,
    policy: RolePolicy,
) -> Result<PathTree, ArchiveError> {
    let entries = lister.list_entries(path)?;
    log::debug!("Building tree from {} entries", entries.len());
    Ok(build_tree_from_entries(entries, policy))
}
