//! Per-node adjacency tables and the edge view handed out by iteration.
//!
//! Each node owns one [`Adjacency`]: an insertion-ordered map from neighbour
//! identity to edge weight. A missing key means "no edge"; callers see that as
//! [`MAX_WEIGHT`]. Directed graphs additionally record, on the target, which
//! sources point at it, so deleting a node can drop its inbound edges without
//! scanning every table.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::id::{NodeHandle, NodeId};

/// Weight reported for a pair of nodes with no edge between them.
///
/// Half of `f64::MAX`, so adding two of them stays finite.
pub const MAX_WEIGHT: f64 = f64::MAX / 2.0;

/// Weight given to edges added without an explicit weight.
pub const DEFAULT_WEIGHT: f64 = 0.0;

/// A live edge as seen by edge iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeRef {
    pub source: NodeHandle,
    pub target: NodeHandle,
    pub weight: f64,
}

/// Adjacency table of a single node.
#[derive(Debug, Clone, Default)]
pub(crate) struct Adjacency {
    /// Neighbour -> weight. Mirrored on the neighbour for undirected graphs.
    out: IndexMap<NodeId, f64>,
    /// Sources with an edge into this node. Only maintained for directed graphs.
    incoming: IndexSet<NodeId>,
}

impl Adjacency {
    pub(crate) fn weight(&self, to: NodeId) -> Option<f64> {
        self.out.get(&to).copied()
    }

    pub(crate) fn contains(&self, to: NodeId) -> bool {
        self.out.contains_key(&to)
    }

    /// Inserts or overwrites the edge to `to`, returning the previous weight.
    pub(crate) fn insert(&mut self, to: NodeId, weight: f64) -> Option<f64> {
        self.out.insert(to, weight)
    }

    pub(crate) fn remove(&mut self, to: NodeId) -> Option<f64> {
        self.out.swap_remove(&to)
    }

    /// Overwrites an existing weight. Returns `false` if there is no edge.
    pub(crate) fn set(&mut self, to: NodeId, weight: f64) -> bool {
        match self.out.get_mut(&to) {
            Some(slot) => {
                *slot = weight;
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.out.len()
    }

    pub(crate) fn iter(&self) -> indexmap::map::Iter<'_, NodeId, f64> {
        self.out.iter()
    }

    pub(crate) fn neighbors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.out.keys().copied()
    }

    pub(crate) fn add_incoming(&mut self, from: NodeId) {
        self.incoming.insert(from);
    }

    pub(crate) fn remove_incoming(&mut self, from: NodeId) {
        self.incoming.swap_remove(&from);
    }

    pub(crate) fn incoming(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming.iter().copied()
    }

    /// Drops every entry, outgoing and incoming.
    pub(crate) fn clear(&mut self) {
        self.out.clear();
        self.incoming.clear();
    }

    /// Rewrites identities through `remap` (old index -> new id), dropping
    /// entries whose neighbour has no new identity.
    pub(crate) fn remap(&mut self, remap: &[Option<NodeId>]) {
        let lookup = |id: &NodeId| remap.get(id.index()).copied().flatten();

        self.out = self
            .out
            .iter()
            .filter_map(|(id, &weight)| lookup(id).map(|new| (new, weight)))
            .collect();
        self.incoming = self.incoming.iter().filter_map(lookup).collect();
    }
}
