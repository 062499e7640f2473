//! Node store: payloads, adjacency tables and liveness flags.
//!
//! Slots are append-only between compactions. Deleting a node only sets its
//! flag in the parallel liveness vector and bumps the pending-deletion
//! counter; the slot (payload included) stays in place until
//! [`NodeStore::compact`] rebuilds the store.
//!
//! Payloads are held behind an `Arc` shared with the value index, so the
//! index can key on them without a second copy.

use std::sync::Arc;

use crate::edge::Adjacency;
use crate::error::GraphError;
use crate::id::{NodeId, MAX_SLOTS};

/// One slot of the node store.
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) value: Arc<T>,
    pub(crate) edges: Adjacency,
}

/// Arena of nodes addressed by [`NodeId`].
#[derive(Debug, Clone)]
pub(crate) struct NodeStore<T> {
    nodes: Vec<Node<T>>,
    /// `deleted[i]` is true once slot `i` has been tombstoned.
    deleted: Vec<bool>,
    /// Tombstoned slots not yet reclaimed by compaction.
    pending: usize,
}

impl<T> NodeStore<T> {
    pub(crate) fn new() -> Self {
        NodeStore {
            nodes: Vec::new(),
            deleted: Vec::new(),
            pending: 0,
        }
    }

    /// Number of slots, live or tombstoned.
    pub(crate) fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn live_count(&self) -> usize {
        self.nodes.len() - self.pending
    }

    pub(crate) fn pending_deletions(&self) -> usize {
        self.pending
    }

    /// Appends a node and returns its identity.
    ///
    /// Fails with [`GraphError::CapacityExceeded`] once [`MAX_SLOTS`] slots
    /// are in use; tombstoned slots count until the next compaction.
    pub(crate) fn push(&mut self, value: Arc<T>) -> Result<NodeId, GraphError> {
        let id = self.next_id()?;
        self.nodes.push(Node {
            value,
            edges: Adjacency::default(),
        });
        self.deleted.push(false);
        Ok(id)
    }

    /// Identity the next pushed node would get.
    pub(crate) fn next_id(&self) -> Result<NodeId, GraphError> {
        NodeId::from_slot(self.nodes.len())
            .ok_or(GraphError::CapacityExceeded { limit: MAX_SLOTS })
    }

    /// True if `id` is in range and not tombstoned.
    #[inline]
    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        matches!(self.deleted.get(id.index()), Some(false))
    }

    /// Slot access without a liveness check. Panics if out of range.
    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn value(&self, id: NodeId) -> &T {
        &self.node(id).value
    }

    /// The shared payload of a slot, as held by the value index.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn shared(&self, id: NodeId) -> &Arc<T> {
        &self.node(id).value
    }

    /// Marks a live slot as deleted. Returns `false` if it was not live.
    pub(crate) fn tombstone(&mut self, id: NodeId) -> bool {
        match self.deleted.get_mut(id.index()) {
            Some(flag) if !*flag => {
                *flag = true;
                self.pending += 1;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn iter_nodes_mut(&mut self) -> impl Iterator<Item = &mut Node<T>> {
        self.nodes.iter_mut()
    }

    /// Drops tombstoned slots, renumbering live ones in their original order.
    ///
    /// Returns the old-index -> new-identity table. Adjacency tables are left
    /// untouched; the caller remaps them with the returned table.
    pub(crate) fn compact(&mut self) -> Vec<Option<NodeId>> {
        let old = std::mem::take(&mut self.nodes);
        let deleted = std::mem::take(&mut self.deleted);
        let mut remap = Vec::with_capacity(old.len());

        // Survivors are fewer than the old slots, so every new id fits.
        let mut next = NodeId(0);
        self.nodes.reserve(old.len() - self.pending);
        for (node, dead) in old.into_iter().zip(deleted) {
            if dead {
                remap.push(None);
            } else {
                remap.push(Some(next));
                self.nodes.push(node);
                next = NodeId(next.0 + 1);
            }
        }

        self.deleted = vec![false; self.nodes.len()];
        self.pending = 0;
        remap
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.deleted.clear();
        self.pending = 0;
    }
}
