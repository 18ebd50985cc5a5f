//! JSON rendering of a [`PathTree`]
//!
//! Every node renders as
//! `{"name":...,"path":...,"isDirectory":...,"children":[...]}` with the fields
//! in that order and no whitespace. An absent node renders as `null`.
//! String values are escaped by `serde_json`.

use crate::tree::{NodeId, PathTree};

/// Serialize the whole tree starting at the root
///
/// # Errors
///
/// Returns the `serde_json` error if a node name or path cannot be encoded.
pub fn tree_to_json(tree: &PathTree) -> Result<String, serde_json::Error> {
    node_to_json(tree, Some(PathTree::ROOT))
}

/// Serialize the subtree rooted at `node`, or `null` when there is no such node
///
/// # Errors
///
/// Returns the `serde_json` error if a node name or path cannot be encoded.
pub fn node_to_json(
    tree: &PathTree,
    node: Option<NodeId>,
) -> Result<String, serde_json::Error> {
    let mut out = String::with_capacity(64 * tree.len());
    match node {
        Some(id) if tree.node(id).is_some() => write_node(tree, id, &mut out)?,
        _ => out.push_str("null"),
    }
    Ok(out)
}

// Iterative so that deeply nested entries cannot exhaust the stack.
fn write_node(tree: &PathTree, start: NodeId, out: &mut String) -> serde_json::Result<()> {
    enum Step {
        Open(NodeId),
        Separator,
        Close,
    }

    let mut stack = vec![Step::Open(start)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Open(id) => {
                let Some(node) = tree.node(id) else {
                    out.push_str("null");
                    continue;
                };
                out.push_str("{\"name\":");
                out.push_str(&serde_json::to_string(&node.name)?);
                out.push_str(",\"path\":");
                out.push_str(&serde_json::to_string(&node.path)?);
                out.push_str(",\"isDirectory\":");
                out.push_str(if node.is_directory { "true" } else { "false" });
                out.push_str(",\"children\":[");

                stack.push(Step::Close);
                for (i, child) in node.children().iter().enumerate().rev() {
                    stack.push(Step::Open(*child));
                    if i > 0 {
                        stack.push(Step::Separator);
                    }
                }
            }
            Step::Separator => out.push(','),
            Step::Close => out.push_str("]}"),
        }
    }
    Ok(())
}
