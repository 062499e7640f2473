//! Export to petgraph, for running graph algorithms over the live topology.

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::EdgeType;

use crate::config::GraphKind;
use crate::error::GraphError;
use crate::graph::Graph;

impl<T: Clone> Graph<T> {
    /// Copies the live nodes and edges into a petgraph `StableGraph`.
    ///
    /// Node indices follow storage order, so after [`recompact`](Self::recompact)
    /// (or on a graph that never deleted a node) `NodeIndex(i)` corresponds to
    /// `NodeId(i)`. `Ty` must match the graph kind, otherwise
    /// [`GraphError::KindMismatch`] is returned.
    pub fn to_stable_graph<Ty: EdgeType>(&self) -> Result<StableGraph<T, f64, Ty, u32>, GraphError> {
        let expected = if Ty::is_directed() {
            GraphKind::Directed
        } else {
            GraphKind::Undirected
        };
        if expected != self.kind() {
            return Err(GraphError::KindMismatch {
                expected,
                found: self.kind(),
            });
        }

        let mut out = StableGraph::with_capacity(self.num_nodes(), self.num_edges());
        let mut index = vec![NodeIndex::end(); self.slot_count()];
        for (handle, value) in self.nodes() {
            index[handle.id().index()] = out.add_node(value.clone());
        }
        for edge in self.edges() {
            out.add_edge(
                index[edge.source.id().index()],
                index[edge.target.id().index()],
                edge.weight,
            );
        }

        Ok(out)
    }
}
