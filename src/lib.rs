//! Story History — branching undo/redo for text documents
//!
//! Don't store copies, store deltas.
//!
//! Tree-shaped edit history for a story editor:
//! - Prefix/suffix text deltas with hash-verified application
//! - Persistent history tree: every edit is a new node, undo never loses work
//! - Periodic snapshots bound reconstruction cost
//! - Age-based pruning that never touches the active root-to-current path
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`codec`] | Binary delta encoding (LEB128 varints) |
//! | [`config`] | Node budget and snapshot interval |
//! | [`delta`] | Retain/Delete/Insert delta engine |
//! | [`error`] | Error enum and `Result` alias |
//! | [`hash`] | 32-bit content fingerprint |
//! | [`node`] | History node and operation metadata |
//! | [`prune`] | Capacity pruning that preserves the current path |
//! | [`session`] | Mutable per-document handle with auto-prune and recovery |
//! | [`tree`] | Persistent history tree: push, undo, redo, navigate |
//! | [`view`] | Flattened depth-first view for timeline rendering |
//!
//! # Feature flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | `Serialize`/`Deserialize` for config, deltas and node metadata |
//!
//! # Quick Start
//!
//! ```
//! use story_history::{HistoryTree, OperationInfo, OperationKind};
//!
//! let tree = HistoryTree::new("A");
//! let tree = tree.push_state("AB", OperationInfo::new(OperationKind::Add, "add B")).unwrap();
//!
//! // Undo returns the repositioned tree plus the restored text
//! let nav = tree.undo().unwrap().unwrap();
//! assert_eq!(nav.content, "A");
//!
//! // The original tree is untouched
//! assert_eq!(tree.current_content().unwrap(), "AB");
//! ```

pub mod codec;
pub mod config;
pub mod delta;
pub mod error;
pub mod hash;
pub mod node;
pub mod prune;
pub mod session;
pub mod tree;
pub mod view;

pub use codec::encoded_delta_size;
pub use config::HistoryConfig;
pub use delta::{apply_delta, can_apply_delta, compute_deltas, ContentDelta, DeltaOp, DeltaPair};
pub use error::{HistoryError, Result};
pub use hash::{hash_content, ContentHash};
pub use node::{HistoryNode, NodeId, OperationInfo, OperationKind};
pub use prune::{prune_dry_run, prune_tree, PruneResult};
pub use session::HistorySession;
pub use tree::{HistoryStats, HistoryTree, Navigation};
pub use view::{tree_view, TreeViewItem};
