//! Error types
//!
//! One error enum for the whole crate. Corruption errors mean the in-memory
//! history no longer agrees with itself; `NodeNotFound` is the only one a
//! caller is expected to shrug off.

use thiserror::Error;

use crate::hash::ContentHash;
use crate::node::NodeId;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Errors raised by the delta engine and the history tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// A delta was applied to content it was not computed against.
    #[error("content hash mismatch: delta expects {expected}, content hashes to {actual}")]
    ContentHashMismatch {
        /// Hash recorded in the delta.
        expected: ContentHash,
        /// Hash of the content actually supplied.
        actual: ContentHash,
    },

    /// No ancestor of the node carries a snapshot.
    #[error("no snapshot found on the path from node {0} to the root")]
    NoSnapshotFound(NodeId),

    /// The node id is not (or no longer) part of the tree.
    #[error("history node {0} not found")]
    NodeNotFound(NodeId),

    /// Rejected configuration value.
    #[error("invalid history config: {0}")]
    InvalidConfig(String),
}

impl HistoryError {
    /// True for errors that mean the history itself is inconsistent.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            HistoryError::ContentHashMismatch { .. } | HistoryError::NoSnapshotFound(_)
        )
    }
}
