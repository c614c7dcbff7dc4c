//! History node model
//!
//! A node describes one committed document state. Non-root nodes carry
//! deltas to and from their parent instead of the full text; the root and
//! every node at a multiple of the snapshot interval also carry a snapshot.
//! Nodes are immutable once inserted into a tree.

use std::time::SystemTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::delta::ContentDelta;

/// History node identifier, unique within a tree
pub type NodeId = u64;

/// Coarse classification of the edit that produced a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum OperationKind {
    /// Text edit inside a knot or stitch
    #[default]
    Edit = 0,
    /// Something was added (knot, choice, line)
    Add = 1,
    /// Something was removed
    Delete = 2,
    /// Reordered or reparented
    Move = 3,
    /// Renamed
    Rename = 4,
    /// Graph layout change
    Layout = 5,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Move => "move",
            Self::Rename => "rename",
            Self::Layout => "layout",
        }
    }
}

/// Descriptive metadata for a history entry. Never affects reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OperationInfo {
    /// Human-readable description ("Edit knot intro")
    pub description: String,
    /// Coarse type tag
    pub kind: OperationKind,
    /// Affected element, e.g. a knot name
    pub target: Option<String>,
}

impl OperationInfo {
    pub fn new(kind: OperationKind, description: &str) -> Self {
        Self {
            description: String::from(description),
            kind,
            target: None,
        }
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(String::from(target));
        self
    }
}

/// One committed document state
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryNode {
    pub id: NodeId,
    /// `None` only for the root
    pub parent_id: Option<NodeId>,
    /// Children in insertion order; more than one makes this a branch point
    pub child_ids: Vec<NodeId>,
    /// Distance from the root
    pub depth: usize,
    pub timestamp: SystemTime,
    pub operation: OperationInfo,
    /// Parent content -> this content. `None` on the root.
    pub forward_delta: Option<ContentDelta>,
    /// This content -> parent content. `None` on the root.
    pub backward_delta: Option<ContentDelta>,
    /// Full content checkpoint
    pub snapshot: Option<String>,
}

impl HistoryNode {
    /// Build the root node for `initial` content.
    pub fn root(id: NodeId, initial: &str, timestamp: SystemTime) -> Self {
        Self {
            id,
            parent_id: None,
            child_ids: Vec::new(),
            depth: 0,
            timestamp,
            operation: OperationInfo::new(OperationKind::Edit, "Initial state"),
            forward_delta: None,
            backward_delta: None,
            snapshot: Some(String::from(initial)),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    #[inline]
    pub fn is_branch_point(&self) -> bool {
        self.child_ids.len() > 1
    }

    #[inline]
    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Most recently added child, the default redo target.
    #[inline]
    pub fn last_child(&self) -> Option<NodeId> {
        self.child_ids.last().copied()
    }
}
