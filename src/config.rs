//! History configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, Result};

/// Snapshot every this many levels below the root.
pub const DEFAULT_SNAPSHOT_INTERVAL: usize = 10;
/// Node budget before pruning kicks in.
pub const DEFAULT_MAX_NODES: usize = 100;

/// Tunables for a history tree and the session that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HistoryConfig {
    /// Maximum number of nodes kept after a push
    pub max_nodes: usize,
    /// Nodes at a depth divisible by this carry a full snapshot
    pub snapshot_interval: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
        }
    }
}

impl HistoryConfig {
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_snapshot_interval(mut self, interval: usize) -> Self {
        self.snapshot_interval = interval;
        self
    }

    /// Reject values the tree cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.snapshot_interval == 0 {
            return Err(HistoryError::InvalidConfig(String::from(
                "snapshot_interval must be at least 1",
            )));
        }
        if self.max_nodes == 0 {
            return Err(HistoryError::InvalidConfig(String::from(
                "max_nodes must be at least 1",
            )));
        }
        Ok(())
    }
}
