//! Directory tree built from slash-delimited archive entry paths
//!
//! Nodes live in a flat arena and refer to their children by [`NodeId`], so the
//! tree has a single owner and no parent back-pointers. Node `0` is always the
//! root: empty name, empty path, and flagged as a directory.
//!
//! Children keep first-seen order, and no two children of a node share a name.

/// Index of a node inside a [`PathTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One directory or file segment of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Final path segment, never contains `/`
    pub name: String,
    /// Slash-joined path from the root (empty for the root itself)
    pub path: String,
    /// Whether the node was created as an intermediate segment
    pub is_directory: bool,
    children: Vec<NodeId>,
}

impl TreeNode {
    fn new(name: String, path: String, is_directory: bool) -> Self {
        Self {
            name,
            path,
            is_directory,
            children: Vec::new(),
        }
    }

    /// Child node ids in first-seen order
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// How a node's directory flag reacts when a later path disagrees with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RolePolicy {
    /// The role assigned at creation is final. A segment first seen as the last
    /// segment of a path stays a file even if a later path walks through it.
    #[default]
    FirstSeenWins,
    /// A node that a later path walks through becomes a directory, and the final
    /// segment of an explicit directory marker (`dir/`) is created as a directory.
    PromoteToDirectory,
}

/// Rooted, append-only tree of archive entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTree {
    nodes: Vec<TreeNode>,
    policy: RolePolicy,
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTree {
    /// Id of the root node
    pub const ROOT: NodeId = NodeId(0);

    /// Create a tree holding only the root, using [`RolePolicy::FirstSeenWins`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(RolePolicy::default())
    }

    /// Create a tree holding only the root
    #[must_use]
    pub fn with_policy(policy: RolePolicy) -> Self {
        Self {
            nodes: vec![TreeNode::new(String::new(), String::new(), true)],
            policy,
        }
    }

    /// The root node
    #[must_use]
    pub fn root(&self) -> &TreeNode {
        &self.nodes[Self::ROOT.0]
    }

    /// Look up a node by id
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Total number of nodes, including the root
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but the root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Iterate the children of `id` in insertion order
    pub fn children_of(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &TreeNode)> + '_ {
        self.node(id)
            .map(TreeNode::children)
            .unwrap_or_default()
            .iter()
            .map(move |&child| (child, &self.nodes[child.0]))
    }

    /// Find the node whose full path equals `path` (empty string is the root)
    #[must_use]
    pub fn find(&self, path: &str) -> Option<NodeId> {
        let mut current = Self::ROOT;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self.child_named(current, segment)?;
        }
        Some(current)
    }

    /// Ensure every non-empty segment of `path` exists as a descendant chain.
    ///
    /// Empty segments from leading, trailing, or doubled separators are skipped.
    /// Returns the id of the node for the last segment, or the root when `path`
    /// has no segments at all.
    pub fn add_path(&mut self, path: &str) -> NodeId {
        self.insert(path, false)
    }

    /// Add one entry as reported by an archive listing.
    ///
    /// A trailing `/` marks an explicit directory entry and is stripped before the
    /// path is added. A marker that is nothing but separators contributes nothing
    /// and yields `None`.
    pub fn add_entry(&mut self, entry: &str) -> Option<NodeId> {
        match entry.strip_suffix('/') {
            Some(bare) => {
                let bare = bare.trim_end_matches('/');
                if bare.is_empty() {
                    return None;
                }
                Some(self.insert(bare, true))
            }
            None if entry.is_empty() => None,
            None => Some(self.insert(entry, false)),
        }
    }

    fn insert(&mut self, path: &str, directory_marker: bool) -> NodeId {
        let promote = self.policy == RolePolicy::PromoteToDirectory;
        let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
        let mut current = Self::ROOT;

        while let Some(segment) = segments.next() {
            let is_last = segments.peek().is_none();
            current = match self.child_named(current, segment) {
                Some(existing) => {
                    if promote && (!is_last || directory_marker) {
                        self.nodes[existing.0].is_directory = true;
                    }
                    existing
                }
                None => {
                    let is_directory = !is_last || (promote && directory_marker);
                    self.push_child(current, segment, is_directory)
                }
            };
        }

        current
    }

    fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].name == name)
    }

    fn push_child(&mut self, parent: NodeId, name: &str, is_directory: bool) -> NodeId {
        let parent_path = &self.nodes[parent.0].path;
        let path = if parent_path.is_empty() {
            name.to_string()
        } else {
            format!("{parent_path}/{name}")
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode::new(name.to_string(), path, is_directory));
        self.nodes[parent.0].children.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn names(tree: &PathTree, id: NodeId) -> Vec<&str> {
        tree.children_of(id).map(|(_, n)| n.name.as_str()).collect()
    }

    #[test]
    fn test_empty_tree_has_root() {
        let tree = PathTree::new();
        let root = tree.root();
        assert_eq!(root.name, "");
        assert_eq!(root.path, "");
        assert!(root.is_directory);
        assert!(root.children().is_empty());
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_nested_paths_share_prefix() {
        let mut tree = PathTree::new();
        tree.add_path("a/b.txt");
        tree.add_path("a/c.txt");
        tree.add_path("d.txt");

        assert_eq!(names(&tree, PathTree::ROOT), vec!["a", "d.txt"]);

        let a = tree.find("a").expect("a exists");
        let a_node = tree.node(a).unwrap();
        assert!(a_node.is_directory);
        assert_eq!(a_node.path, "a");
        assert_eq!(names(&tree, a), vec!["b.txt", "c.txt"]);

        let c = tree.node(tree.find("a/c.txt").unwrap()).unwrap();
        assert_eq!(c.path, "a/c.txt");
        assert!(!c.is_directory);

        let d = tree.node(tree.find("d.txt").unwrap()).unwrap();
        assert_eq!(d.path, "d.txt");
        assert!(!d.is_directory);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let mut tree = PathTree::new();
        tree.add_path("/x//y/");
        tree.add_path("x/y");

        assert_eq!(tree.len(), 3);
        let y = tree.node(tree.find("x/y").unwrap()).unwrap();
        assert_eq!(y.path, "x/y");
        assert!(!y.is_directory);
    }

    #[test]
    fn test_path_of_only_separators_adds_nothing() {
        let mut tree = PathTree::new();
        assert_eq!(tree.add_path("///"), PathTree::ROOT);
        assert_eq!(tree.add_path(""), PathTree::ROOT);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_readding_path_is_idempotent() {
        let mut tree = PathTree::new();
        tree.add_path("a/b/c.txt");
        let snapshot = tree.clone();
        tree.add_path("a/b/c.txt");
        assert_eq!(tree, snapshot);
    }

    #[test]
    fn test_first_seen_role_is_kept() {
        let mut tree = PathTree::new();
        tree.add_path("a");
        tree.add_path("a/b.txt");

        let a = tree.node(tree.find("a").unwrap()).unwrap();
        assert!(!a.is_directory, "file role assigned first must stick");
        assert_eq!(names(&tree, tree.find("a").unwrap()), vec!["b.txt"]);
    }

    #[test]
    fn test_directory_marker_is_stripped() {
        let mut tree = PathTree::new();
        assert!(tree.add_entry("/").is_none());
        assert!(tree.add_entry("").is_none());
        let docs = tree.add_entry("docs/").expect("marker adds node");
        tree.add_entry("docs/readme.md");

        let node = tree.node(docs).unwrap();
        assert_eq!(node.path, "docs");
        // bare marker path ends on its last segment, so the first-seen role is file
        assert!(!node.is_directory);
        assert_eq!(names(&tree, docs), vec!["readme.md"]);
    }

    #[test]
    fn test_promote_policy_fixes_roles() {
        let mut tree = PathTree::with_policy(RolePolicy::PromoteToDirectory);
        tree.add_path("a");
        tree.add_path("a/b.txt");
        tree.add_entry("docs/");

        assert!(tree.node(tree.find("a").unwrap()).unwrap().is_directory);
        assert!(tree.node(tree.find("docs").unwrap()).unwrap().is_directory);
        assert!(!tree.node(tree.find("a/b.txt").unwrap()).unwrap().is_directory);
    }

    #[test]
    fn test_promote_policy_does_not_demote() {
        let mut tree = PathTree::with_policy(RolePolicy::PromoteToDirectory);
        tree.add_path("a/b");
        tree.add_path("a");
        assert!(tree.node(tree.find("a").unwrap()).unwrap().is_directory);
    }

    #[test]
    fn test_node_count_matches_distinct_prefixes() {
        let entries = [
            "src/main.rs",
            "src/lib/mod.rs",
            "src/lib/util.rs",
            "README.md",
            "docs/guide/intro.md",
        ];
        let mut tree = PathTree::new();
        let mut prefixes = BTreeSet::new();
        for entry in entries {
            tree.add_path(entry);
            let segments: Vec<&str> = entry.split('/').collect();
            for end in 1..=segments.len() {
                prefixes.insert(segments[..end].join("/"));
            }
        }
        assert_eq!(tree.len(), prefixes.len() + 1);
    }

    #[test]
    fn test_find_missing_path() {
        let mut tree = PathTree::new();
        tree.add_path("a/b");
        assert_eq!(tree.find(""), Some(PathTree::ROOT));
        assert!(tree.find("a/c").is_none());
        assert!(tree.find("b").is_none());
    }
}
