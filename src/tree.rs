//! Branching history tree
//!
//! Persistent tree of document states. Every mutation returns a new
//! `HistoryTree`; the old value stays valid and unchanged. Nodes are held
//! behind `Arc`, so a push clones only the id -> node table and the one
//! parent node whose child list grows.
//!
//! Content is reconstructed by walking up to the nearest snapshot and
//! replaying forward deltas back down. Every delta application is
//! hash-checked, so a broken chain fails loudly instead of producing
//! wrong text.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, trace};

use crate::codec::encoded_delta_size;
use crate::config::{HistoryConfig, DEFAULT_SNAPSHOT_INTERVAL};
use crate::delta::{apply_delta, compute_deltas, DeltaPair};
use crate::error::{HistoryError, Result};
use crate::node::{HistoryNode, NodeId, OperationInfo};

/// Result of a move through history: the repositioned tree and the
/// document content at the new position.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub tree: HistoryTree,
    pub content: String,
}

/// Aggregate numbers about a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryStats {
    pub node_count: usize,
    pub snapshot_count: usize,
    /// Nodes with more than one child
    pub branch_points: usize,
    pub max_depth: usize,
    /// Encoded size of every stored delta, forward and backward
    pub delta_bytes: usize,
}

/// Branching undo/redo history
#[derive(Debug, Clone)]
pub struct HistoryTree {
    nodes: Arc<BTreeMap<NodeId, Arc<HistoryNode>>>,
    root_id: NodeId,
    current_id: NodeId,
    next_id: NodeId,
    snapshot_interval: usize,
}

impl HistoryTree {
    /// Fresh tree whose root holds `initial`.
    pub fn new(initial: &str) -> Self {
        Self::build(initial, DEFAULT_SNAPSHOT_INTERVAL)
    }

    /// Fresh tree using `config`'s snapshot interval.
    pub fn with_config(initial: &str, config: &HistoryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(initial, config.snapshot_interval))
    }

    fn build(initial: &str, snapshot_interval: usize) -> Self {
        let root_id: NodeId = 0;
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root_id,
            Arc::new(HistoryNode::root(root_id, initial, SystemTime::now())),
        );
        Self {
            nodes: Arc::new(nodes),
            root_id,
            current_id: root_id,
            next_id: root_id + 1,
            snapshot_interval,
        }
    }

    // ── Queries ────────────────────────────────────────────────────────

    #[inline]
    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    #[inline]
    pub fn current_id(&self) -> NodeId {
        self.current_id
    }

    #[inline]
    pub fn snapshot_interval(&self) -> usize {
        self.snapshot_interval
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&HistoryNode> {
        self.nodes.get(&id).map(Arc::as_ref)
    }

    pub fn current_node(&self) -> Option<&HistoryNode> {
        self.get_node(self.current_id)
    }

    /// All nodes in id (creation) order.
    pub fn nodes(&self) -> impl Iterator<Item = &HistoryNode> {
        self.nodes.values().map(Arc::as_ref)
    }

    fn node(&self, id: NodeId) -> Result<&HistoryNode> {
        self.get_node(id).ok_or(HistoryError::NodeNotFound(id))
    }

    pub fn can_undo(&self) -> bool {
        self.current_node().is_some_and(|n| n.parent_id.is_some())
    }

    pub fn can_redo(&self) -> bool {
        self.current_node().is_some_and(|n| !n.child_ids.is_empty())
    }

    /// Children of the current node, oldest first.
    pub fn redo_branches(&self) -> Vec<&HistoryNode> {
        self.current_node()
            .map(|n| {
                n.child_ids
                    .iter()
                    .filter_map(|&id| self.get_node(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids from the root down to `id`, inclusive.
    pub fn path_to(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(node_id) = cursor {
            let node = self.node(node_id)?;
            path.push(node_id);
            cursor = node.parent_id;
        }
        path.reverse();
        Ok(path)
    }

    /// Ids from the root down to the current node.
    pub fn path_to_current(&self) -> Vec<NodeId> {
        self.path_to(self.current_id).unwrap_or_default()
    }

    pub(crate) fn current_path_set(&self) -> BTreeSet<NodeId> {
        self.path_to_current().into_iter().collect()
    }

    pub fn stats(&self) -> HistoryStats {
        let mut stats = HistoryStats {
            node_count: self.nodes.len(),
            ..HistoryStats::default()
        };
        for node in self.nodes() {
            if node.has_snapshot() {
                stats.snapshot_count += 1;
            }
            if node.is_branch_point() {
                stats.branch_points += 1;
            }
            stats.max_depth = stats.max_depth.max(node.depth);
            stats.delta_bytes += node
                .forward_delta
                .iter()
                .chain(node.backward_delta.iter())
                .map(encoded_delta_size)
                .sum::<usize>();
        }
        stats
    }

    // ── Reconstruction ─────────────────────────────────────────────────

    /// Collect the nodes between `id` and its nearest snapshot ancestor.
    /// Returns the snapshot text and the nodes to replay, deepest first.
    fn replay_plan(&self, id: NodeId) -> Result<(&str, Vec<&HistoryNode>)> {
        let mut pending = Vec::new();
        let mut cursor = self.node(id)?;
        loop {
            if let Some(snapshot) = cursor.snapshot.as_deref() {
                return Ok((snapshot, pending));
            }
            pending.push(cursor);
            cursor = match cursor.parent_id.and_then(|p| self.get_node(p)) {
                Some(parent) => parent,
                None => return Err(HistoryError::NoSnapshotFound(id)),
            };
        }
    }

    /// Full document content at `id`.
    pub fn content_at(&self, id: NodeId) -> Result<String> {
        let (snapshot, pending) = self.replay_plan(id)?;
        let mut content = String::from(snapshot);
        for node in pending.iter().rev() {
            let delta = node
                .forward_delta
                .as_ref()
                .ok_or(HistoryError::NoSnapshotFound(id))?;
            content = apply_delta(&content, delta)?;
        }
        trace!(node = id, replayed = pending.len(), "reconstructed content");
        Ok(content)
    }

    /// Number of forward deltas replayed to reconstruct `id`.
    pub fn replay_len(&self, id: NodeId) -> Result<usize> {
        self.replay_plan(id).map(|(_, pending)| pending.len())
    }

    pub fn current_content(&self) -> Result<String> {
        self.content_at(self.current_id)
    }

    // ── Mutation ───────────────────────────────────────────────────────

    /// Commit `content` as a new child of the current node.
    ///
    /// Returns an unchanged copy when `content` equals the current content.
    /// Pushing below a node that already has children starts a new branch;
    /// existing history is never truncated.
    pub fn push_state(&self, content: &str, operation: OperationInfo) -> Result<Self> {
        self.push_state_at(content, operation, SystemTime::now())
    }

    /// [`push_state`](Self::push_state) with an explicit timestamp.
    pub fn push_state_at(
        &self,
        content: &str,
        operation: OperationInfo,
        timestamp: SystemTime,
    ) -> Result<Self> {
        let current = self.node(self.current_id)?;
        let current_content = self.content_at(self.current_id)?;
        if current_content == content {
            trace!(node = self.current_id, "push skipped, content unchanged");
            return Ok(self.clone());
        }

        let DeltaPair { forward, backward } = compute_deltas(&current_content, content);
        let id = self.next_id;
        let depth = current.depth + 1;
        let snapshot = (depth % self.snapshot_interval == 0).then(|| String::from(content));

        debug!(
            node = id,
            parent = current.id,
            depth,
            snapshot = snapshot.is_some(),
            branch = !current.child_ids.is_empty(),
            op = operation.kind.as_str(),
            "pushed history state"
        );

        let node = HistoryNode {
            id,
            parent_id: Some(current.id),
            child_ids: Vec::new(),
            depth,
            timestamp,
            operation,
            forward_delta: Some(forward),
            backward_delta: Some(backward),
            snapshot,
        };
        let mut parent = current.clone();
        parent.child_ids.push(id);

        let mut next = self.clone();
        next.next_id += 1;
        next.current_id = id;
        let nodes = next.nodes_mut();
        nodes.insert(parent.id, Arc::new(parent));
        nodes.insert(id, Arc::new(node));
        Ok(next)
    }

    /// Move to the parent. `Ok(None)` at the root.
    pub fn undo(&self) -> Result<Option<Navigation>> {
        let Some(parent_id) = self.node(self.current_id)?.parent_id else {
            return Ok(None);
        };
        let content = self.content_at(parent_id)?;
        debug!(from = self.current_id, to = parent_id, "undo");
        Ok(Some(self.moved_to(parent_id, content)))
    }

    /// Move to a child. `Ok(None)` at a leaf.
    ///
    /// Goes to `child` when it is a direct child of the current node,
    /// otherwise to the most recently added child.
    pub fn redo(&self, child: Option<NodeId>) -> Result<Option<Navigation>> {
        let current = self.node(self.current_id)?;
        let Some(latest) = current.last_child() else {
            return Ok(None);
        };
        let target = match child {
            Some(id) if current.child_ids.contains(&id) => id,
            _ => latest,
        };
        let content = self.content_at(target)?;
        debug!(from = self.current_id, to = target, "redo");
        Ok(Some(self.moved_to(target, content)))
    }

    /// Jump to any node.
    pub fn navigate_to(&self, id: NodeId) -> Result<Navigation> {
        if !self.contains(id) {
            return Err(HistoryError::NodeNotFound(id));
        }
        let content = self.content_at(id)?;
        debug!(from = self.current_id, to = id, "navigate");
        Ok(self.moved_to(id, content))
    }

    fn moved_to(&self, id: NodeId, content: String) -> Navigation {
        Navigation {
            tree: Self {
                current_id: id,
                ..self.clone()
            },
            content,
        }
    }

    /// Copy-on-write access to the node table.
    pub(crate) fn nodes_mut(&mut self) -> &mut BTreeMap<NodeId, Arc<HistoryNode>> {
        Arc::make_mut(&mut self.nodes)
    }
}
