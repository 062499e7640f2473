//! Node identities and the epoch-tagged handles built on them.
//!
//! A [`NodeId`] is a raw slot index into the node store. It stays valid until
//! the next compaction, which renumbers every live node. A [`NodeHandle`]
//! pairs a `NodeId` with the [`Epoch`] it was issued in, so a handle that
//! outlives a compaction is detected instead of silently pointing at a
//! different node.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Number of slots a node store can hold, tombstones included.
///
/// Identities are `u32` and `u32::MAX` is never issued, so at most
/// `u32::MAX` slots exist between compactions.
pub const MAX_SLOTS: usize = u32::MAX as usize;

/// Raw node identity: the index of the node's slot in the node store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Returns the slot index as a `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Identity for slot `index`, or `None` past [`MAX_SLOTS`].
    pub(crate) fn from_slot(index: usize) -> Option<NodeId> {
        u32::try_from(index)
            .ok()
            .filter(|&raw| raw != u32::MAX)
            .map(NodeId)
    }
}

/// Compaction generation of a graph.
///
/// Starts at zero and advances on every compaction and every `clear`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Epoch(pub u64);

impl Epoch {
    pub(crate) fn next(self) -> Epoch {
        Epoch(self.0.wrapping_add(1))
    }
}

/// Detached reference to a live node.
///
/// Handles are produced by [`Graph::add_node`](crate::Graph::add_node),
/// [`Graph::find_node`](crate::Graph::find_node) and by node and adjacency
/// iteration. They are `Copy` and do not borrow the graph, so they can be kept
/// across mutations. Every handle-based operation checks the epoch first and
/// fails with [`GraphError::StaleHandle`](crate::GraphError::StaleHandle) if
/// the graph has been compacted or cleared since the handle was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeHandle {
    id: NodeId,
    epoch: Epoch,
}

impl NodeHandle {
    pub(crate) fn new(id: NodeId, epoch: Epoch) -> Self {
        NodeHandle { id, epoch }
    }

    /// The raw identity this handle points at.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The epoch this handle was issued in.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
}

// Display implementations -- just print the inner value.

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.epoch)
    }
}

// Bridge between NodeId and petgraph's NodeIndex<u32>.

impl From<NodeIndex<u32>> for NodeId {
    fn from(idx: NodeIndex<u32>) -> Self {
        NodeId(idx.index() as u32)
    }
}

impl From<NodeId> for NodeIndex<u32> {
    fn from(id: NodeId) -> Self {
        NodeIndex::new(id.index())
    }
}
