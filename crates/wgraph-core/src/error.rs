//! Error types for wgraph-core.
//!
//! Uses `thiserror` for structured, matchable variants. Every failure is a
//! local, recoverable condition handed back to the immediate caller; nothing
//! in the crate retries on the caller's behalf.

use thiserror::Error;

use crate::config::GraphKind;
use crate::id::{Epoch, NodeId};

/// Errors produced by graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The handle is out of range or refers to a deleted node.
    #[error("invalid node handle: NodeId({id})", id = id.0)]
    InvalidHandle { id: NodeId },

    /// No live node carries the requested value.
    #[error("node not found")]
    NotFound,

    /// A live node already carries an equal value.
    #[error("duplicate node value")]
    DuplicateValue,

    /// `set_weight` targeted a pair with no edge between them.
    #[error("edge not found: {from} -> {to}")]
    EdgeNotFound { from: NodeId, to: NodeId },

    /// The handle was issued before the last compaction or clear.
    #[error("stale node handle: issued in epoch {handle_epoch}, graph is at epoch {current_epoch}")]
    StaleHandle {
        handle_epoch: Epoch,
        current_epoch: Epoch,
    },

    /// Edge weights must be finite.
    #[error("invalid edge weight: {weight}")]
    InvalidWeight { weight: f64 },

    /// The node store has no identity left for a new slot.
    #[error("node store is full: at most {limit} slots between compactions")]
    CapacityExceeded { limit: usize },

    /// The requested export direction does not match the graph.
    #[error("graph kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: GraphKind, found: GraphKind },

    /// JSON serialization or deserialization of a snapshot failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
