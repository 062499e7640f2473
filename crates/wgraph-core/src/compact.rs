//! Compaction: reclaiming the slots of deleted nodes.
//!
//! Deletion only tombstones a slot. Compaction rebuilds the node store with
//! the live nodes alone, keeps their relative order, renumbers them
//! sequentially from zero, and rewrites the value index and every adjacency
//! table through the resulting old-to-new identity table.

use crate::graph::Graph;

impl<T: Ord> Graph<T> {
    /// Compacts the node store and advances the epoch.
    ///
    /// Every [`NodeHandle`](crate::NodeHandle) and [`NodeId`](crate::NodeId)
    /// obtained before this call is invalidated: node identities are
    /// reassigned, and handles from the previous epoch fail with
    /// [`GraphError::StaleHandle`](crate::GraphError::StaleHandle). Topology
    /// and weights between surviving nodes are preserved.
    ///
    /// Also runs automatically from [`delete_node`](Self::delete_node) once
    /// the pending deletion count reaches the configured threshold.
    pub fn recompact(&mut self) {
        let removed = self.nodes.pending_deletions();
        let remap = self.nodes.compact();

        self.index.remap(&remap);
        for node in self.nodes.iter_nodes_mut() {
            node.edges.remap(&remap);
        }
        // Entries to dead nodes are already gone, so this only re-derives
        // the counter from the rebuilt tables.
        self.edge_count = self.count_edges();
        self.epoch = self.epoch.next();

        tracing::debug!(
            live = self.nodes.live_count(),
            removed,
            epoch = %self.epoch,
            "recompacted graph"
        );

        #[cfg(debug_assertions)]
        self.assert_consistency();
    }
}
