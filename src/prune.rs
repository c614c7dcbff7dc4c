//! Capacity pruning for the history tree
//!
//! Keeps a tree within a node budget by discarding the oldest abandoned
//! branches. The root-to-current path is never touched.

use std::collections::BTreeSet;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::node::NodeId;
use crate::tree::HistoryTree;

// ── Prune Result ───────────────────────────────────────────────────────

/// Statistics from a prune run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PruneResult {
    /// Number of nodes kept.
    pub retained: usize,
    /// Number of nodes removed, including orphaned descendants.
    pub removed: usize,
    /// Total nodes before pruning.
    pub total_before: usize,
    /// Removed ids, in removal order.
    pub removed_ids: Vec<NodeId>,
}

impl PruneResult {
    /// True if any nodes were removed.
    #[inline]
    pub fn did_prune(&self) -> bool {
        self.removed > 0
    }
}

// ── Pruning ────────────────────────────────────────────────────────────

/// Shrink `tree` to at most `max_nodes` nodes.
///
/// # Algorithm
///
/// 1. **Protect**: every node on the root-to-current path.
/// 2. **Order**: all other nodes by `(timestamp, id)`, oldest first.
/// 3. **Evict**: take the first `node_count - max_nodes` of them and
///    remove each together with its whole subtree. A candidate already
///    removed as a descendant of an earlier one is skipped.
///
/// Subtree removal can take the tree below `max_nodes`. A node off the
/// protected path can have no protected descendant, since the path is
/// closed under taking parents. If the path alone exceeds `max_nodes`,
/// the tree is left at the path length.
pub fn prune_tree(tree: &HistoryTree, max_nodes: usize) -> (HistoryTree, PruneResult) {
    let result = plan(tree, max_nodes);
    if !result.did_prune() {
        return (tree.clone(), result);
    }

    let removed: BTreeSet<NodeId> = result.removed_ids.iter().copied().collect();
    let mut next = tree.clone();
    let nodes = next.nodes_mut();

    // Detach subtree roots from surviving parents
    for &id in &result.removed_ids {
        let parent_id = match nodes.get(&id).and_then(|n| n.parent_id) {
            Some(p) if !removed.contains(&p) => p,
            _ => continue,
        };
        let Some(mut parent) = nodes.get(&parent_id).map(|p| p.as_ref().clone()) else {
            continue;
        };
        parent.child_ids.retain(|&c| c != id);
        nodes.insert(parent_id, Arc::new(parent));
    }
    for id in &removed {
        nodes.remove(id);
    }

    debug!(
        removed = result.removed,
        retained = result.retained,
        max_nodes,
        "pruned history"
    );
    (next, result)
}

/// Compute what [`prune_tree`] would remove without building a new tree.
pub fn prune_dry_run(tree: &HistoryTree, max_nodes: usize) -> PruneResult {
    plan(tree, max_nodes)
}

fn plan(tree: &HistoryTree, max_nodes: usize) -> PruneResult {
    let total_before = tree.node_count();
    if total_before <= max_nodes {
        return PruneResult {
            retained: total_before,
            removed: 0,
            total_before,
            removed_ids: Vec::new(),
        };
    }

    let protected = tree.current_path_set();
    let mut candidates: Vec<_> = tree
        .nodes()
        .filter(|n| !protected.contains(&n.id))
        .map(|n| (n.timestamp, n.id))
        .collect();
    candidates.sort_unstable();

    let excess = total_before - max_nodes;
    let mut removed_set = BTreeSet::new();
    let mut removed_ids = Vec::new();
    for (_, id) in candidates.into_iter().take(excess) {
        if removed_set.contains(&id) {
            continue;
        }
        // Iterative subtree walk
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            debug_assert!(!protected.contains(&node_id));
            if protected.contains(&node_id) || !removed_set.insert(node_id) {
                continue;
            }
            removed_ids.push(node_id);
            if let Some(node) = tree.get_node(node_id) {
                stack.extend(node.child_ids.iter().rev().copied());
            }
        }
    }

    PruneResult {
        retained: total_before - removed_ids.len(),
        removed: removed_ids.len(),
        total_before,
        removed_ids,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
