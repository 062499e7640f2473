//! Value index: payload value -> node identity.
//!
//! An ordered map keyed by the same `Arc` the node store holds, so every
//! payload has one allocation. Lookups, insertions and removals are
//! O(log n); only compaction walks the whole map.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::id::NodeId;
#[cfg(any(test, debug_assertions))]
use crate::node::NodeStore;

#[derive(Debug, Clone)]
pub(crate) struct ValueIndex<T> {
    /// Live payloads and the identity of the node carrying each.
    ids: BTreeMap<Arc<T>, NodeId>,
}

impl<T> ValueIndex<T> {
    pub(crate) fn new() -> Self {
        ValueIndex {
            ids: BTreeMap::new(),
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    /// Rewrites identities after compaction, dropping entries whose node is
    /// gone.
    pub(crate) fn remap(&mut self, remap: &[Option<NodeId>])
    where
        T: Ord,
    {
        self.ids
            .retain(|_, id| match remap.get(id.index()).copied().flatten() {
                Some(new) => {
                    *id = new;
                    true
                }
                None => false,
            });
    }

    pub(crate) fn clear(&mut self) {
        self.ids.clear();
    }

    /// True if every entry points at a live slot holding the very same
    /// payload allocation.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn matches_store(&self, store: &NodeStore<T>) -> bool {
        self.ids
            .iter()
            .all(|(value, &id)| store.is_live(id) && Arc::ptr_eq(value, store.shared(id)))
    }
}

impl<T: Ord> ValueIndex<T> {
    /// Identity of the live node carrying `value`, if any.
    pub(crate) fn find(&self, value: &T) -> Option<NodeId> {
        self.ids.get(value).copied()
    }

    /// Records `value -> id`. Returns the existing identity if an equal value
    /// is already indexed, leaving the index unchanged.
    pub(crate) fn insert(&mut self, value: Arc<T>, id: NodeId) -> Result<(), NodeId> {
        match self.ids.entry(value) {
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
            Entry::Occupied(existing) => Err(*existing.get()),
        }
    }

    /// Removes `value` and returns the identity it pointed at.
    pub(crate) fn remove(&mut self, value: &T) -> Option<NodeId> {
        self.ids.remove(value)
    }
}
