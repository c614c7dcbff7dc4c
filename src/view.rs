//! Flattened tree view
//!
//! Depth-first listing of the history tree with everything a timeline
//! widget needs per row, so the UI never re-derives topology.

use std::time::SystemTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::node::{NodeId, OperationInfo};
use crate::tree::HistoryTree;

/// One row of the rendered history
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeViewItem {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub depth: usize,
    pub timestamp: SystemTime,
    pub operation: OperationInfo,
    /// On the root-to-current path
    pub is_on_current_path: bool,
    pub is_current: bool,
    /// Number of children the parent has (1 for an only child, 0 for root)
    pub sibling_count: usize,
    /// Position among the parent's children
    pub sibling_index: usize,
    pub has_siblings: bool,
    pub is_last_child: bool,
    pub child_count: usize,
}

/// Pre-order depth-first traversal from the root; children in insertion
/// order.
pub fn tree_view(tree: &HistoryTree) -> Vec<TreeViewItem> {
    let on_path = tree.current_path_set();
    let mut items = Vec::with_capacity(tree.node_count());

    // (id, sibling_index, sibling_count)
    let mut stack = vec![(tree.root_id(), 0usize, 0usize)];
    while let Some((id, sibling_index, sibling_count)) = stack.pop() {
        let Some(node) = tree.get_node(id) else {
            continue;
        };
        items.push(TreeViewItem {
            id,
            parent_id: node.parent_id,
            depth: node.depth,
            timestamp: node.timestamp,
            operation: node.operation.clone(),
            is_on_current_path: on_path.contains(&id),
            is_current: id == tree.current_id(),
            sibling_count,
            sibling_index,
            has_siblings: sibling_count > 1,
            is_last_child: sibling_count == 0 || sibling_index + 1 == sibling_count,
            child_count: node.child_ids.len(),
        });

        let count = node.child_ids.len();
        for (index, &child) in node.child_ids.iter().enumerate().rev() {
            stack.push((child, index, count));
        }
    }
    items
}
