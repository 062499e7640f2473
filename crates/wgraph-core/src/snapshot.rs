//! Serializable images of a graph.
//!
//! A [`GraphSnapshot`] is the compacted form of a [`Graph`]: live payloads in
//! storage order and each logical edge once, with endpoints given as
//! positions in the node list. Snapshots carry no epochs or handles, so a
//! graph rebuilt from one starts fresh.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::GraphKind;
use crate::error::GraphError;
use crate::graph::Graph;
use crate::id::{NodeHandle, NodeId};

/// An edge in a snapshot, by node position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    pub source: u32,
    pub target: u32,
    pub weight: f64,
}

/// Owned, serde-friendly copy of a graph's live contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot<T> {
    pub kind: GraphKind,
    pub nodes: Vec<T>,
    pub edges: Vec<SnapshotEdge>,
}

impl<T: Serialize> GraphSnapshot<T> {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<T: DeserializeOwned> GraphSnapshot<T> {
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<T: Clone> Graph<T> {
    /// Copies the live nodes and edges into a snapshot.
    ///
    /// Node positions in the snapshot follow storage order, so for a graph
    /// with no pending deletions they equal the current node identities.
    pub fn to_snapshot(&self) -> GraphSnapshot<T> {
        let mut position = vec![u32::MAX; self.slot_count()];
        let mut nodes = Vec::with_capacity(self.num_nodes());
        for ((handle, value), pos) in self.nodes().zip(0u32..) {
            position[handle.id().index()] = pos;
            nodes.push(value.clone());
        }

        let edges = self
            .edges()
            .map(|edge| SnapshotEdge {
                source: position[edge.source.id().index()],
                target: position[edge.target.id().index()],
                weight: edge.weight,
            })
            .collect();

        GraphSnapshot {
            kind: self.kind(),
            nodes,
            edges,
        }
    }
}

impl<T: Ord> TryFrom<GraphSnapshot<T>> for Graph<T> {
    type Error = GraphError;

    /// Rebuilds a graph with the default compaction threshold.
    ///
    /// Fails with [`GraphError::DuplicateValue`] on repeated payloads,
    /// [`GraphError::InvalidHandle`] on an edge endpoint past the node list
    /// and [`GraphError::InvalidWeight`] on a non-finite weight.
    fn try_from(snapshot: GraphSnapshot<T>) -> Result<Self, Self::Error> {
        let mut graph = Graph::new(snapshot.kind);
        let handles = snapshot
            .nodes
            .into_iter()
            .map(|value| graph.add_node(value))
            .collect::<Result<Vec<NodeHandle>, GraphError>>()?;

        let endpoint = |position: u32| {
            handles
                .get(position as usize)
                .copied()
                .ok_or(GraphError::InvalidHandle {
                    id: NodeId(position),
                })
        };
        for edge in &snapshot.edges {
            graph.add_edge(endpoint(edge.source)?, endpoint(edge.target)?, edge.weight)?;
        }

        Ok(graph)
    }
}
