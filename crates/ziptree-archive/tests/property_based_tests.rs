//! Property-Based Tests
//!
//! Invariants checked over arbitrary entry lists:
//! - Tree construction is idempotent and every entry is reachable
//! - One node per distinct path prefix, plus the root
//! - Every node's path is its parent's path joined with its own name
//! - Serialized trees are always valid JSON and rebuild to the same text

use proptest::prelude::*;
use std::collections::BTreeSet;
use ziptree_archive::{build_tree_from_entries, tree_to_json, NodeId, PathTree, RolePolicy};

fn entry_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[ab/]{0,10}", 0..12)
}

fn policy() -> impl Strategy<Value = RolePolicy> {
    prop_oneof![
        Just(RolePolicy::FirstSeenWins),
        Just(RolePolicy::PromoteToDirectory)
    ]
}

fn normalized(entry: &str) -> String {
    entry
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn render(tree: &PathTree) -> Result<String, TestCaseError> {
    tree_to_json(tree).map_err(|e| TestCaseError::fail(e.to_string()))
}

fn collect_file_paths(node: &serde_json::Value, out: &mut Vec<String>) {
    if node["isDirectory"] == false {
        if let Some(path) = node["path"].as_str() {
            out.push(path.to_string());
        }
    }
    if let Some(children) = node["children"].as_array() {
        for child in children {
            collect_file_paths(child, out);
        }
    }
}

fn check_paths(tree: &PathTree, id: NodeId) -> Result<(), TestCaseError> {
    let parent_path = tree.node(id).map(|n| n.path.clone()).unwrap_or_default();
    for (child_id, child) in tree.children_of(id) {
        prop_assert!(!child.name.is_empty());
        prop_assert!(!child.name.contains('/'));
        let expected = if parent_path.is_empty() {
            child.name.clone()
        } else {
            format!("{}/{}", parent_path, child.name)
        };
        prop_assert_eq!(&child.path, &expected);
        check_paths(tree, child_id)?;
    }
    Ok(())
}

// ============================================================================
// Tree Construction Properties
// ============================================================================

/// Property: Adding the same entries a second time changes nothing
#[test]
fn proptest_insertion_idempotent() {
    proptest!(|(entries in entry_list(), policy in policy())| {
        let once = build_tree_from_entries(&entries, policy);
        let twice = build_tree_from_entries(entries.iter().chain(entries.iter()), policy);
        prop_assert_eq!(once.len(), twice.len());
        prop_assert_eq!(render(&once)?, render(&twice)?);
    });
}

/// Property: Every entry with at least one segment can be found by its normalized path
#[test]
fn proptest_entries_are_findable() {
    proptest!(|(entries in entry_list(), policy in policy())| {
        let tree = build_tree_from_entries(&entries, policy);
        for entry in &entries {
            let path = normalized(entry);
            if path.is_empty() {
                continue;
            }
            let id = tree.find(&path);
            prop_assert!(id.is_some(), "missing {:?}", entry);
            let node = id.and_then(|id| tree.node(id));
            prop_assert_eq!(node.map(|n| n.path.as_str()), Some(path.as_str()));
        }
    });
}

/// Property: The tree holds exactly one node per distinct path prefix, plus the root
#[test]
fn proptest_node_count_matches_distinct_prefixes() {
    proptest!(|(entries in entry_list(), policy in policy())| {
        let tree = build_tree_from_entries(&entries, policy);
        let mut prefixes = BTreeSet::new();
        for entry in &entries {
            let segments: Vec<&str> = entry.split('/').filter(|s| !s.is_empty()).collect();
            for end in 1..=segments.len() {
                prefixes.insert(segments[..end].join("/"));
            }
        }
        prop_assert_eq!(tree.len(), prefixes.len() + 1);
    });
}

/// Property: Node paths are consistent with the parent chain
#[test]
fn proptest_paths_follow_parents() {
    proptest!(|(entries in entry_list(), policy in policy())| {
        let tree = build_tree_from_entries(&entries, policy);
        prop_assert!(tree.root().is_directory);
        prop_assert_eq!(tree.root().path.as_str(), "");
        check_paths(&tree, PathTree::ROOT)?;
    });
}

/// Property: With promotion on, every node that has children is a directory
#[test]
fn proptest_promoted_interior_nodes_are_directories() {
    proptest!(|(entries in entry_list())| {
        let tree = build_tree_from_entries(&entries, RolePolicy::PromoteToDirectory);
        let mut stack = vec![PathTree::ROOT];
        while let Some(id) = stack.pop() {
            for (child_id, child) in tree.children_of(id) {
                if !child.children().is_empty() {
                    prop_assert!(child.is_directory, "{} has children", child.path);
                }
                stack.push(child_id);
            }
        }
    });
}

// ============================================================================
// JSON Serialization Properties
// ============================================================================

/// Property: Any tree serializes to JSON that serde_json accepts
#[test]
fn proptest_tree_json_is_valid() {
    proptest!(|(entries in prop::collection::vec("(\\PC|[\\x00-\\x1f]){0,16}", 0..8))| {
        let tree = build_tree_from_entries(&entries, RolePolicy::FirstSeenWins);
        let json = render(&tree)?;
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(&json);
        prop_assert!(parsed.is_ok(), "invalid JSON: {}", json);
    });
}

/// Property: Serialize, parse, rebuild from the file nodes, serialize gives the same text
#[test]
fn proptest_reserialization_is_stable() {
    proptest!(|(entries in entry_list())| {
        let tree = build_tree_from_entries(&entries, RolePolicy::FirstSeenWins);
        let first = render(&tree)?;
        let parsed: serde_json::Value = serde_json::from_str(&first)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let mut files = Vec::new();
        collect_file_paths(&parsed, &mut files);
        let mut rebuilt = PathTree::new();
        for path in &files {
            rebuilt.add_path(path);
        }
        prop_assert_eq!(render(&rebuilt)?, first);
    });
}

/// Property: Names survive serialization unchanged, control characters included
#[test]
fn proptest_names_round_trip() {
    proptest!(|(name in "(\\PC|[\\x00-\\x1f])+")| {
        let name = name.replace('/', "_");
        let mut tree = PathTree::new();
        tree.add_path(&name);
        let parsed: serde_json::Value = serde_json::from_str(&render(&tree)?)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(parsed["children"][0]["name"].as_str(), Some(name.as_str()));
    });
}
