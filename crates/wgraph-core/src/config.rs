//! Construction-time configuration.

use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Number of pending deletions that triggers an automatic compaction.
pub const DEFAULT_COMPACTION_THRESHOLD: usize = 10_000;

/// Edge direction semantics, fixed for the lifetime of a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    /// Edges go from source to target only.
    #[default]
    Directed,
    /// Every edge is stored in both endpoints' tables.
    Undirected,
}

impl GraphKind {
    pub fn is_directed(self) -> bool {
        matches!(self, GraphKind::Directed)
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphKind::Directed => write!(f, "directed"),
            GraphKind::Undirected => write!(f, "undirected"),
        }
    }
}

/// Options for [`Graph::with_config`](crate::Graph::with_config).
///
/// Deserializes with defaults for missing fields, so `{}` yields a directed
/// graph compacting every 10000 deletions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Directed or undirected.
    pub kind: GraphKind,
    /// Pending deletions that trigger an automatic compaction. `None`
    /// disables automatic compaction; `recompact` must then be called by hand.
    pub compaction_threshold: Option<NonZeroUsize>,
}

impl GraphConfig {
    pub fn new(kind: GraphKind) -> Self {
        GraphConfig {
            kind,
            ..GraphConfig::default()
        }
    }

    /// Returns a copy with the given compaction threshold.
    pub fn with_compaction_threshold(mut self, threshold: Option<NonZeroUsize>) -> Self {
        self.compaction_threshold = threshold;
        self
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            kind: GraphKind::Directed,
            compaction_threshold: NonZeroUsize::new(DEFAULT_COMPACTION_THRESHOLD),
        }
    }
}
