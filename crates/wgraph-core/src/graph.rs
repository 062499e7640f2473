//! Graph: the weighted graph container.
//!
//! [`Graph`] composes the node store, the value index and the per-node
//! adjacency tables behind a single API. Every node operation is reachable
//! through two access paths, selected by the [`NodeKey`] passed in:
//!
//! - a [`NodeHandle`]: O(1), validated against the node store and the
//!   current epoch;
//! - a `&T` payload value: O(log n), resolved through the value index.
//!
//! Both paths land on the same node store. Payloads are reference-counted
//! and shared with the value index, which keys on them.
//!
//! # Deletion
//!
//! Deleting a node is O(degree): its incident edges are removed from every
//! table that mentions it, its index entry is dropped and its slot is
//! tombstoned. The slot itself is reclaimed by [`Graph::recompact`], which
//! runs automatically once the configured number of deletions is pending.
//! Compaction renumbers nodes and advances the [`Epoch`]; handles issued
//! before it are rejected with [`GraphError::StaleHandle`].

use std::num::NonZeroUsize;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::config::{GraphConfig, GraphKind};
use crate::edge::{DEFAULT_WEIGHT, MAX_WEIGHT};
use crate::error::GraphError;
use crate::id::{Epoch, NodeHandle, NodeId};
use crate::index::ValueIndex;
use crate::iter::{Edges, Neighbors, Nodes};
use crate::node::NodeStore;

/// Anything that identifies a node of a `Graph<T>`.
///
/// Implemented for [`NodeHandle`] (the fast path) and for `&T` (lookup by
/// value).
pub trait NodeKey<T> {
    /// Resolves the key to the identity of a live node.
    fn resolve(&self, graph: &Graph<T>) -> Result<NodeId, GraphError>;
}

impl<T> NodeKey<T> for NodeHandle {
    fn resolve(&self, graph: &Graph<T>) -> Result<NodeId, GraphError> {
        graph.resolve_handle(*self)
    }
}

impl<T: Ord> NodeKey<T> for &T {
    fn resolve(&self, graph: &Graph<T>) -> Result<NodeId, GraphError> {
        graph.index.find(*self).ok_or(GraphError::NotFound)
    }
}

/// Weighted, directed or undirected graph over payloads of type `T`.
///
/// Payloads are unique: adding a value equal to a live node's value fails
/// with [`GraphError::DuplicateValue`].
#[derive(Debug, Clone)]
pub struct Graph<T> {
    pub(crate) kind: GraphKind,
    pub(crate) nodes: NodeStore<T>,
    pub(crate) index: ValueIndex<T>,
    /// Live logical edges. An undirected edge counts once.
    pub(crate) edge_count: usize,
    pub(crate) compaction_threshold: Option<NonZeroUsize>,
    pub(crate) epoch: Epoch,
}

impl<T> Graph<T> {
    /// Creates an empty graph of the given kind with the default compaction
    /// threshold.
    pub fn new(kind: GraphKind) -> Self {
        Self::with_config(GraphConfig::new(kind))
    }

    pub fn directed() -> Self {
        Self::new(GraphKind::Directed)
    }

    pub fn undirected() -> Self {
        Self::new(GraphKind::Undirected)
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Graph {
            kind: config.kind,
            nodes: NodeStore::new(),
            index: ValueIndex::new(),
            edge_count: 0,
            compaction_threshold: config.compaction_threshold,
            epoch: Epoch::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn is_directed(&self) -> bool {
        self.kind.is_directed()
    }

    /// Number of live nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.live_count()
    }

    /// Number of live edges. An undirected edge is counted once.
    pub fn num_edges(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.num_nodes() == 0
    }

    /// Current compaction generation. Handles from any other epoch are stale.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Deleted nodes whose slots have not been reclaimed yet.
    pub fn pending_deletions(&self) -> usize {
        self.nodes.pending_deletions()
    }

    /// Number of node slots, including tombstoned ones.
    pub fn slot_count(&self) -> usize {
        self.nodes.slot_count()
    }

    pub fn compaction_threshold(&self) -> Option<NonZeroUsize> {
        self.compaction_threshold
    }

    /// Changes the automatic compaction threshold. `None` disables it.
    ///
    /// Takes effect on the next deletion; lowering the threshold below the
    /// current pending count does not compact immediately.
    pub fn set_compaction_threshold(&mut self, threshold: Option<NonZeroUsize>) {
        self.compaction_threshold = threshold;
    }

    /// Removes every node and edge and advances the epoch.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edge_count = 0;
        self.epoch = self.epoch.next();
    }

    /// Payload of the node behind `handle`.
    pub fn value(&self, handle: NodeHandle) -> Result<&T, GraphError> {
        let id = self.resolve_handle(handle)?;
        Ok(self.nodes.value(id))
    }

    // -----------------------------------------------------------------------
    // Iteration
    // -----------------------------------------------------------------------

    /// Live nodes in storage order.
    pub fn nodes(&self) -> Nodes<'_, T> {
        Nodes::new(&self.nodes, self.epoch)
    }

    /// Live edges. Each undirected edge is yielded once, from its lower
    /// endpoint.
    pub fn edges(&self) -> Edges<'_, T> {
        Edges::new(&self.nodes, self.epoch, self.kind)
    }

    /// Live neighbours of one node (successors, for a directed graph).
    pub fn neighbors<K: NodeKey<T>>(&self, node: K) -> Result<Neighbors<'_, T>, GraphError> {
        let id = node.resolve(self)?;
        Ok(Neighbors::new(&self.nodes, self.epoch, id))
    }

    // -----------------------------------------------------------------------
    // Edge methods
    // -----------------------------------------------------------------------

    /// Adds an edge from `a` to `b`, or overwrites its weight if it exists.
    ///
    /// Both endpoints and the weight are validated before anything is
    /// written, so an undirected edge is either mirrored in both tables or
    /// not inserted at all.
    pub fn add_edge<A, B>(&mut self, a: A, b: B, weight: f64) -> Result<(), GraphError>
    where
        A: NodeKey<T>,
        B: NodeKey<T>,
    {
        let from = a.resolve(self)?;
        let to = b.resolve(self)?;
        check_weight(weight)?;

        self.insert_edge(from, to, weight);
        Ok(())
    }

    /// Adds an edge with [`DEFAULT_WEIGHT`].
    pub fn add_unweighted_edge<A, B>(&mut self, a: A, b: B) -> Result<(), GraphError>
    where
        A: NodeKey<T>,
        B: NodeKey<T>,
    {
        self.add_edge(a, b, DEFAULT_WEIGHT)
    }

    /// Removes the edge from `a` to `b`.
    ///
    /// Returns `Ok(false)` if there was no such edge; the endpoints must
    /// still be valid.
    pub fn delete_edge<A, B>(&mut self, a: A, b: B) -> Result<bool, GraphError>
    where
        A: NodeKey<T>,
        B: NodeKey<T>,
    {
        let from = a.resolve(self)?;
        let to = b.resolve(self)?;
        Ok(self.remove_edge(from, to))
    }

    pub fn is_adjacent<A, B>(&self, a: A, b: B) -> Result<bool, GraphError>
    where
        A: NodeKey<T>,
        B: NodeKey<T>,
    {
        let from = a.resolve(self)?;
        let to = b.resolve(self)?;
        Ok(self.nodes.node(from).edges.contains(to))
    }

    /// Weight of the edge from `a` to `b`, or [`MAX_WEIGHT`] if there is none.
    pub fn weight<A, B>(&self, a: A, b: B) -> Result<f64, GraphError>
    where
        A: NodeKey<T>,
        B: NodeKey<T>,
    {
        let from = a.resolve(self)?;
        let to = b.resolve(self)?;
        Ok(self.nodes.node(from).edges.weight(to).unwrap_or(MAX_WEIGHT))
    }

    /// Updates the weight of an existing edge.
    ///
    /// Unlike [`add_edge`](Self::add_edge), this never creates an edge:
    /// returns [`GraphError::EdgeNotFound`] if there is none.
    pub fn set_weight<A, B>(&mut self, a: A, b: B, weight: f64) -> Result<(), GraphError>
    where
        A: NodeKey<T>,
        B: NodeKey<T>,
    {
        let from = a.resolve(self)?;
        let to = b.resolve(self)?;
        check_weight(weight)?;

        if !self.nodes.node_mut(from).edges.set(to, weight) {
            return Err(GraphError::EdgeNotFound { from, to });
        }
        if !self.is_directed() {
            self.nodes.node_mut(to).edges.set(from, weight);
        }
        Ok(())
    }

    /// Number of live neighbours (successors, for a directed graph).
    pub fn degree<K: NodeKey<T>>(&self, node: K) -> Result<usize, GraphError> {
        let id = node.resolve(self)?;
        Ok(self.nodes.node(id).edges.len())
    }

    // -----------------------------------------------------------------------
    // Internals shared with compaction, iteration and snapshots
    // -----------------------------------------------------------------------

    pub(crate) fn resolve_handle(&self, handle: NodeHandle) -> Result<NodeId, GraphError> {
        if handle.epoch() != self.epoch {
            return Err(GraphError::StaleHandle {
                handle_epoch: handle.epoch(),
                current_epoch: self.epoch,
            });
        }
        let id = handle.id();
        if !self.nodes.is_live(id) {
            return Err(GraphError::InvalidHandle { id });
        }
        Ok(id)
    }

    pub(crate) fn handle(&self, id: NodeId) -> NodeHandle {
        NodeHandle::new(id, self.epoch)
    }

    fn insert_edge(&mut self, from: NodeId, to: NodeId, weight: f64) {
        let created = self.nodes.node_mut(from).edges.insert(to, weight).is_none();

        let mirror = &mut self.nodes.node_mut(to).edges;
        if self.kind.is_directed() {
            mirror.add_incoming(from);
        } else {
            mirror.insert(from, weight);
        }

        if created {
            self.edge_count += 1;
        }
    }

    fn remove_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        if self.nodes.node_mut(from).edges.remove(to).is_none() {
            return false;
        }

        let mirror = &mut self.nodes.node_mut(to).edges;
        if self.kind.is_directed() {
            mirror.remove_incoming(from);
        } else {
            mirror.remove(from);
        }

        self.edge_count -= 1;
        true
    }

    /// Removes every edge incident to `id`, in both directions.
    fn detach(&mut self, id: NodeId) {
        let node = &self.nodes.node(id).edges;
        let targets: SmallVec<[NodeId; 8]> = node.neighbors().collect();
        let sources: SmallVec<[NodeId; 8]> = node.incoming().collect();
        let directed = self.is_directed();

        let mut removed = targets.len();
        for &target in targets.iter().filter(|&&t| t != id) {
            let other = &mut self.nodes.node_mut(target).edges;
            if directed {
                other.remove_incoming(id);
            } else {
                other.remove(id);
            }
        }
        // A self-loop was already counted among the targets.
        for &source in sources.iter().filter(|&&s| s != id) {
            if self.nodes.node_mut(source).edges.remove(id).is_some() {
                removed += 1;
            }
        }

        self.nodes.node_mut(id).edges.clear();
        self.edge_count -= removed;
    }

    /// Counts live logical edges by walking every table.
    pub(crate) fn count_edges(&self) -> usize {
        let mut entries = 0;
        let mut loops = 0;
        for (handle, _) in self.nodes() {
            let edges = &self.nodes.node(handle.id()).edges;
            entries += edges.len();
            if edges.contains(handle.id()) {
                loops += 1;
            }
        }
        if self.is_directed() {
            entries
        } else {
            (entries + loops) / 2
        }
    }
}

impl<T: Ord> Graph<T> {
    // -----------------------------------------------------------------------
    // Node methods
    // -----------------------------------------------------------------------

    /// Adds a node carrying `value` and returns its handle.
    ///
    /// Returns [`GraphError::DuplicateValue`] if a live node already carries
    /// an equal value. Slots of deleted nodes are never reused here; they are
    /// reclaimed by compaction. Returns [`GraphError::CapacityExceeded`] if
    /// no slot identity is left.
    pub fn add_node(&mut self, value: T) -> Result<NodeHandle, GraphError> {
        let id = self.nodes.next_id()?;
        let value = Arc::new(value);
        self.index
            .insert(Arc::clone(&value), id)
            .map_err(|_| GraphError::DuplicateValue)?;
        self.nodes.push(value)?;
        Ok(self.handle(id))
    }

    /// Looks up the live node carrying `value`.
    pub fn find_node(&self, value: &T) -> Result<NodeHandle, GraphError> {
        self.index
            .find(value)
            .map(|id| self.handle(id))
            .ok_or(GraphError::NotFound)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.index.find(value).is_some()
    }

    /// Deletes a node and every edge touching it.
    ///
    /// The slot is tombstoned, not freed. If this deletion brings the pending
    /// count to the compaction threshold, the graph is recompacted before
    /// returning, and every handle issued so far becomes stale.
    pub fn delete_node<K: NodeKey<T>>(&mut self, node: K) -> Result<(), GraphError> {
        let id = node.resolve(self)?;

        self.detach(id);
        let unindexed = self.index.remove(self.nodes.value(id));
        debug_assert_eq!(unindexed, Some(id), "value index out of step with node {}", id);
        let tombstoned = self.nodes.tombstone(id);
        debug_assert!(tombstoned, "node {} was already tombstoned", id);
        tracing::trace!(node = %id, pending = self.nodes.pending_deletions(), "deleted node");

        if let Some(threshold) = self.compaction_threshold {
            if self.nodes.pending_deletions() >= threshold.get() {
                self.recompact();
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Debug consistency assertion
    // -----------------------------------------------------------------------

    /// Verifies the cross-structure invariants: the index covers exactly the
    /// live nodes in value order, no table points at a dead node, undirected
    /// edges are mirrored with equal weights, directed incoming sets match
    /// the outgoing tables, and the edge counter is exact.
    ///
    /// Only compiled in debug and test builds.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn assert_consistency(&self) {
        assert_eq!(
            self.index.len(),
            self.nodes.live_count(),
            "value index does not cover the live nodes"
        );
        assert!(
            self.index.matches_store(&self.nodes),
            "value index points at a dead slot or a foreign payload"
        );

        for (handle, _) in self.nodes() {
            let id = handle.id();
            let edges = &self.nodes.node(id).edges;
            for (&to, &weight) in edges.iter() {
                assert!(self.nodes.is_live(to), "edge {} -> {} targets a dead node", id, to);
                let mirror = &self.nodes.node(to).edges;
                if self.is_directed() {
                    assert!(
                        mirror.incoming().any(|s| s == id),
                        "edge {} -> {} missing from incoming set",
                        id,
                        to
                    );
                } else {
                    assert_eq!(
                        mirror.weight(id),
                        Some(weight),
                        "undirected edge {} - {} is not mirrored",
                        id,
                        to
                    );
                }
            }
            for source in edges.incoming() {
                assert!(
                    self.nodes.node(source).edges.contains(id),
                    "incoming entry {} -> {} has no outgoing edge",
                    source,
                    id
                );
            }
        }

        assert_eq!(self.edge_count, self.count_edges(), "edge counter drifted");
    }
}

impl<'a, T> IntoIterator for &'a Graph<T> {
    type Item = (NodeHandle, &'a T);
    type IntoIter = Nodes<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes()
    }
}

fn check_weight(weight: f64) -> Result<(), GraphError> {
    if weight.is_finite() {
        Ok(())
    } else {
        Err(GraphError::InvalidWeight { weight })
    }
}
