//! Weighted graph container with lazy node deletion.
//!
//! ```
//! use wgraph_core::{Graph, MAX_WEIGHT};
//!
//! let mut graph = Graph::directed();
//! let a = graph.add_node("A").unwrap();
//! let b = graph.add_node("B").unwrap();
//! graph.add_edge(a, b, 5.0).unwrap();
//!
//! assert_eq!(graph.weight(&"A", &"B").unwrap(), 5.0);
//! assert_eq!(graph.weight(b, a).unwrap(), MAX_WEIGHT);
//! ```

pub mod config;
pub mod edge;
pub mod error;
pub mod graph;
pub mod id;
pub mod iter;
pub mod snapshot;

mod compact;
mod index;
mod interop;
mod node;

// Re-export commonly used types
pub use config::{GraphConfig, GraphKind, DEFAULT_COMPACTION_THRESHOLD};
pub use edge::{EdgeRef, DEFAULT_WEIGHT, MAX_WEIGHT};
pub use error::GraphError;
pub use graph::{Graph, NodeKey};
pub use id::{Epoch, NodeHandle, NodeId, MAX_SLOTS};
pub use iter::{Adjacent, Edges, Neighbors, Nodes};
pub use snapshot::{GraphSnapshot, SnapshotEdge};
