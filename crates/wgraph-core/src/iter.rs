//! Iteration over nodes, edges and neighbours.
//!
//! All three iterators borrow the graph, so the graph cannot change while
//! one is alive. They share two primitives that hide deleted nodes:
//! [`SlotCursor`] walks node slots and stops only on live ones, and
//! [`next_live_entry`] does the same over one adjacency table. The handles
//! they yield are detached [`NodeHandle`]s and may be kept after the
//! iterator is dropped.

use std::fmt;
use std::iter::FusedIterator;

use crate::config::GraphKind;
use crate::edge::EdgeRef;
use crate::id::{Epoch, NodeHandle, NodeId};
use crate::node::NodeStore;

type TableIter<'a> = indexmap::map::Iter<'a, NodeId, f64>;

/// Forward position over node slots.
#[derive(Debug, Clone, Default)]
pub(crate) struct SlotCursor {
    next: usize,
}

impl SlotCursor {
    /// Moves past the next live slot and returns it.
    pub(crate) fn advance<T>(&mut self, store: &NodeStore<T>) -> Option<NodeId> {
        while self.next < store.slot_count() {
            let id = NodeId::from_slot(self.next)?;
            self.next += 1;
            if store.is_live(id) {
                return Some(id);
            }
        }
        None
    }

    fn remaining<T>(&self, store: &NodeStore<T>) -> usize {
        store.slot_count().saturating_sub(self.next)
    }
}

/// Next entry of an adjacency table whose neighbour is live.
pub(crate) fn next_live_entry<T>(
    store: &NodeStore<T>,
    entries: &mut TableIter<'_>,
) -> Option<(NodeId, f64)> {
    entries
        .by_ref()
        .map(|(&id, &weight)| (id, weight))
        .find(|&(id, _)| store.is_live(id))
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Iterator over live nodes in storage order.
///
/// Created by [`Graph::nodes`](crate::Graph::nodes).
pub struct Nodes<'a, T> {
    store: &'a NodeStore<T>,
    epoch: Epoch,
    cursor: SlotCursor,
}

impl<'a, T> Nodes<'a, T> {
    pub(crate) fn new(store: &'a NodeStore<T>, epoch: Epoch) -> Self {
        Nodes {
            store,
            epoch,
            cursor: SlotCursor::default(),
        }
    }
}

impl<'a, T> Iterator for Nodes<'a, T> {
    type Item = (NodeHandle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        let id = self.cursor.advance(store)?;
        Some((NodeHandle::new(id, self.epoch), store.value(id)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cursor.remaining(self.store)))
    }
}

impl<T> FusedIterator for Nodes<'_, T> {}

impl<T> Clone for Nodes<'_, T> {
    fn clone(&self) -> Self {
        Nodes {
            store: self.store,
            epoch: self.epoch,
            cursor: self.cursor.clone(),
        }
    }
}

impl<T> fmt::Debug for Nodes<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nodes")
            .field("epoch", &self.epoch)
            .field("cursor", &self.cursor)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// Iterator over live edges.
///
/// Sources are visited in storage order and, within a source, targets in
/// insertion order. In an undirected graph both mirrored entries exist, so
/// only the one with `source <= target` is yielded.
///
/// Created by [`Graph::edges`](crate::Graph::edges).
pub struct Edges<'a, T> {
    store: &'a NodeStore<T>,
    epoch: Epoch,
    directed: bool,
    cursor: SlotCursor,
    /// Source currently being drained and what is left of its table.
    current: Option<(NodeId, TableIter<'a>)>,
}

impl<'a, T> Edges<'a, T> {
    pub(crate) fn new(store: &'a NodeStore<T>, epoch: Epoch, kind: GraphKind) -> Self {
        Edges {
            store,
            epoch,
            directed: kind.is_directed(),
            cursor: SlotCursor::default(),
            current: None,
        }
    }
}

impl<T> Iterator for Edges<'_, T> {
    type Item = EdgeRef;

    fn next(&mut self) -> Option<EdgeRef> {
        let store = self.store;
        loop {
            if let Some((source, entries)) = &mut self.current {
                while let Some((target, weight)) = next_live_entry(store, entries) {
                    if self.directed || *source <= target {
                        return Some(EdgeRef {
                            source: NodeHandle::new(*source, self.epoch),
                            target: NodeHandle::new(target, self.epoch),
                            weight,
                        });
                    }
                }
            }
            // Current table exhausted; move to the next live source.
            let source = self.cursor.advance(store)?;
            self.current = Some((source, store.node(source).edges.iter()));
        }
    }
}

impl<T> FusedIterator for Edges<'_, T> {}

impl<T> Clone for Edges<'_, T> {
    fn clone(&self) -> Self {
        Edges {
            store: self.store,
            epoch: self.epoch,
            directed: self.directed,
            cursor: self.cursor.clone(),
            current: self.current.clone(),
        }
    }
}

impl<T> fmt::Debug for Edges<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edges")
            .field("epoch", &self.epoch)
            .field("directed", &self.directed)
            .field("cursor", &self.cursor)
            .field("source", &self.current.as_ref().map(|(id, _)| *id))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Neighbors
// ---------------------------------------------------------------------------

/// A live neighbour yielded by [`Neighbors`].
pub struct Adjacent<'a, T> {
    pub handle: NodeHandle,
    pub value: &'a T,
    /// Weight of the edge leading to this neighbour.
    pub weight: f64,
}

impl<T> Clone for Adjacent<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Adjacent<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Adjacent<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adjacent")
            .field("handle", &self.handle)
            .field("value", self.value)
            .field("weight", &self.weight)
            .finish()
    }
}

/// Iterator over the live neighbours of one node, in edge insertion order.
///
/// Created by [`Graph::neighbors`](crate::Graph::neighbors).
pub struct Neighbors<'a, T> {
    store: &'a NodeStore<T>,
    epoch: Epoch,
    entries: TableIter<'a>,
}

impl<'a, T> Neighbors<'a, T> {
    pub(crate) fn new(store: &'a NodeStore<T>, epoch: Epoch, node: NodeId) -> Self {
        Neighbors {
            store,
            epoch,
            entries: store.node(node).edges.iter(),
        }
    }
}

impl<'a, T> Iterator for Neighbors<'a, T> {
    type Item = Adjacent<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        let (id, weight) = next_live_entry(store, &mut self.entries)?;
        Some(Adjacent {
            handle: NodeHandle::new(id, self.epoch),
            value: store.value(id),
            weight,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.entries.len()))
    }
}

impl<T> FusedIterator for Neighbors<'_, T> {}

impl<T> Clone for Neighbors<'_, T> {
    fn clone(&self) -> Self {
        Neighbors {
            store: self.store,
            epoch: self.epoch,
            entries: self.entries.clone(),
        }
    }
}

impl<T> fmt::Debug for Neighbors<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neighbors")
            .field("epoch", &self.epoch)
            .field("remaining", &self.entries.len())
            .finish()
    }
}
