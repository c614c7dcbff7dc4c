//! Editing session
//!
//! Mutable handle an editor keeps for one open document: owns the current
//! history tree, applies the configured node budget after every push, and
//! throws the history away (keeping the document) if it ever turns out to
//! be corrupt.

use tracing::{debug, warn};

use crate::config::HistoryConfig;
use crate::error::{HistoryError, Result};
use crate::node::{HistoryNode, NodeId, OperationInfo};
use crate::prune::{prune_tree, PruneResult};
use crate::tree::{HistoryTree, Navigation};
use crate::view::{tree_view, TreeViewItem};

/// Undo/redo history for one document
#[derive(Debug, Clone)]
pub struct HistorySession {
    tree: HistoryTree,
    config: HistoryConfig,
    /// Content at the current node, as last confirmed
    content: String,
}

impl HistorySession {
    pub fn new(initial: &str, config: HistoryConfig) -> Result<Self> {
        let tree = HistoryTree::with_config(initial, &config)?;
        Ok(Self {
            tree,
            config,
            content: String::from(initial),
        })
    }

    pub fn tree(&self) -> &HistoryTree {
        &self.tree
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn current_content(&self) -> &str {
        &self.content
    }

    pub fn can_undo(&self) -> bool {
        self.tree.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.tree.can_redo()
    }

    pub fn redo_branches(&self) -> Vec<&HistoryNode> {
        self.tree.redo_branches()
    }

    pub fn view(&self) -> Vec<TreeViewItem> {
        tree_view(&self.tree)
    }

    /// Commit a new document state, then prune to `max_nodes`.
    pub fn push(&mut self, content: &str, operation: OperationInfo) -> Result<PruneResult> {
        let pushed = match self.tree.push_state(content, operation) {
            Ok(tree) => tree,
            Err(err) => return Err(self.recover(err)),
        };
        let (tree, result) = prune_tree(&pushed, self.config.max_nodes);
        self.tree = tree;
        self.content = String::from(content);
        Ok(result)
    }

    /// Step back. Returns the restored content, or `None` at the root.
    pub fn undo(&mut self) -> Result<Option<&str>> {
        let moved = self.tree.undo();
        self.settle(moved)
    }

    /// Step forward, to `child` if given and valid, else the newest branch.
    pub fn redo(&mut self, child: Option<NodeId>) -> Result<Option<&str>> {
        let moved = self.tree.redo(child);
        self.settle(moved)
    }

    /// Jump to `id`. A stale id yields `NodeNotFound` and leaves the
    /// session untouched.
    pub fn navigate(&mut self, id: NodeId) -> Result<&str> {
        match self.tree.navigate_to(id) {
            Ok(nav) => {
                self.apply(nav);
                Ok(&self.content)
            }
            Err(err) => Err(self.recover(err)),
        }
    }

    /// Change the node budget and prune right away.
    pub fn set_max_nodes(&mut self, max_nodes: usize) -> Result<PruneResult> {
        let config = self.config.with_max_nodes(max_nodes);
        config.validate()?;
        self.config = config;
        let (tree, result) = prune_tree(&self.tree, max_nodes);
        self.tree = tree;
        Ok(result)
    }

    /// Drop all history and start over from `content`.
    pub fn reset(&mut self, content: &str) {
        debug!(nodes = self.tree.node_count(), "history reset");
        // config was validated on construction
        self.tree = HistoryTree::with_config(content, &self.config)
            .unwrap_or_else(|_| HistoryTree::new(content));
        self.content = String::from(content);
    }

    fn settle(&mut self, moved: Result<Option<Navigation>>) -> Result<Option<&str>> {
        match moved {
            Ok(Some(nav)) => {
                self.apply(nav);
                Ok(Some(&self.content))
            }
            Ok(None) => Ok(None),
            Err(err) => Err(self.recover(err)),
        }
    }

    fn apply(&mut self, nav: Navigation) {
        self.tree = nav.tree;
        self.content = nav.content;
    }

    fn recover(&mut self, err: HistoryError) -> HistoryError {
        if err.is_corruption() {
            warn!(error = %err, "history is inconsistent, resetting to current document");
            let content = std::mem::take(&mut self.content);
            self.reset(&content);
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::OperationKind;
    use std::sync::Arc;

    fn op(desc: &str) -> OperationInfo {
        OperationInfo::new(OperationKind::Edit, desc)
    }

    fn session(max_nodes: usize) -> HistorySession {
        HistorySession::new("", HistoryConfig::default().with_max_nodes(max_nodes)).unwrap()
    }

    #[test]
    fn new_rejects_bad_config() {
        let config = HistoryConfig::default().with_snapshot_interval(0);
        assert!(HistorySession::new("", config).is_err());
    }

    #[test]
    fn push_undo_redo() {
        let mut s = session(100);
        s.push("a", op("a")).unwrap();
        s.push("ab", op("b")).unwrap();
        assert_eq!(s.current_content(), "ab");
        assert_eq!(s.undo().unwrap(), Some("a"));
        assert_eq!(s.undo().unwrap(), Some(""));
        assert_eq!(s.undo().unwrap(), None);
        assert_eq!(s.current_content(), "");
        assert_eq!(s.redo(None).unwrap(), Some("a"));
        assert!(s.can_undo());
        assert!(s.can_redo());
    }

    #[test]
    fn push_auto_prunes() {
        let mut s = session(3);
        s.push("a", op("a")).unwrap();
        s.undo().unwrap();
        s.push("b", op("b")).unwrap();
        s.undo().unwrap();
        let result = s.push("c", op("c")).unwrap();
        assert!(result.did_prune());
        assert_eq!(s.tree().node_count(), 3);
        assert_eq!(s.current_content(), "c");
    }

    #[test]
    fn long_chain_stays_on_path() {
        let mut s = session(3);
        for i in 0..6 {
            s.push(&i.to_string(), op("n")).unwrap();
        }
        // the path itself is never pruned
        assert_eq!(s.tree().node_count(), 7);
        assert_eq!(s.undo().unwrap(), Some("4"));
    }

    #[test]
    fn set_max_nodes_prunes_immediately() {
        let mut s = session(100);
        s.push("a", op("a")).unwrap();
        s.undo().unwrap();
        s.push("b", op("b")).unwrap();
        assert_eq!(s.tree().node_count(), 3);
        let result = s.set_max_nodes(2).unwrap();
        assert_eq!(result.removed, 1);
        assert_eq!(s.tree().node_count(), 2);
        assert_eq!(s.config().max_nodes, 2);
        assert!(s.set_max_nodes(0).is_err());
        assert_eq!(s.config().max_nodes, 2);
    }

    #[test]
    fn navigate_to_stale_id_keeps_state() {
        let mut s = session(100);
        s.push("a", op("a")).unwrap();
        let before = s.tree().current_id();
        let err = s.navigate(12345).unwrap_err();
        assert_eq!(err, HistoryError::NodeNotFound(12345));
        assert_eq!(s.tree().current_id(), before);
        assert_eq!(s.tree().node_count(), 2);
    }

    #[test]
    fn navigate_between_branches() {
        let mut s = session(100);
        s.push("a", op("a")).unwrap();
        let a = s.tree().current_id();
        s.undo().unwrap();
        s.push("b", op("b")).unwrap();
        assert_eq!(s.navigate(a).unwrap(), "a");
        assert_eq!(s.redo_branches().len(), 0);
        assert_eq!(s.view().len(), 3);
    }

    #[test]
    fn corruption_resets_history_but_keeps_document() {
        let mut s = session(100);
        s.push("a", op("a")).unwrap();
        s.push("ab", op("b")).unwrap();

        let root_id = s.tree.root_id();
        let mut root = s.tree.get_node(root_id).unwrap().clone();
        root.snapshot = Some(String::from("tampered"));
        s.tree.nodes_mut().insert(root_id, Arc::new(root));

        let err = s.undo().unwrap_err();
        assert!(err.is_corruption());
        assert_eq!(s.tree().node_count(), 1);
        assert_eq!(s.current_content(), "ab");
        assert_eq!(s.tree().current_content().unwrap(), "ab");
    }

    #[test]
    fn reset_clears_history() {
        let mut s = session(100);
        s.push("a", op("a")).unwrap();
        s.push("ab", op("b")).unwrap();
        s.reset("fresh");
        assert_eq!(s.tree().node_count(), 1);
        assert_eq!(s.current_content(), "fresh");
        assert!(!s.can_undo());
    }
}
