//! Property tests: random operation sequences checked against a simple
//! map-based model of the graph.

use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroUsize;

use proptest::prelude::*;
use wgraph_core::{Graph, GraphConfig, GraphError, GraphKind, MAX_WEIGHT};

#[derive(Debug, Clone)]
enum Op {
    AddNode(u8),
    DeleteNode(u8),
    AddEdge(u8, u8, f64),
    DeleteEdge(u8, u8),
    SetWeight(u8, u8, f64),
    Recompact,
}

fn arb_op() -> impl Strategy<Value = Op> {
    let value = 0u8..12;
    let weight = -100.0f64..100.0;
    prop_oneof![
        3 => value.clone().prop_map(Op::AddNode),
        1 => value.clone().prop_map(Op::DeleteNode),
        4 => (value.clone(), value.clone(), weight.clone())
            .prop_map(|(a, b, w)| Op::AddEdge(a, b, w)),
        1 => (value.clone(), value.clone()).prop_map(|(a, b)| Op::DeleteEdge(a, b)),
        1 => (value.clone(), value, weight).prop_map(|(a, b, w)| Op::SetWeight(a, b, w)),
        1 => Just(Op::Recompact),
    ]
}

fn arb_kind() -> impl Strategy<Value = GraphKind> {
    prop_oneof![Just(GraphKind::Directed), Just(GraphKind::Undirected)]
}

/// Reference model: live values and edges keyed by endpoint values.
#[derive(Debug, Default)]
struct Model {
    directed: bool,
    nodes: BTreeSet<u8>,
    edges: BTreeMap<(u8, u8), f64>,
}

impl Model {
    fn key(&self, a: u8, b: u8) -> (u8, u8) {
        if self.directed || a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    fn apply(&mut self, op: &Op) -> Result<(), GraphError> {
        match *op {
            Op::AddNode(v) => {
                if !self.nodes.insert(v) {
                    return Err(GraphError::DuplicateValue);
                }
            }
            Op::DeleteNode(v) => {
                if !self.nodes.remove(&v) {
                    return Err(GraphError::NotFound);
                }
                self.edges.retain(|&(a, b), _| a != v && b != v);
            }
            Op::AddEdge(a, b, w) => {
                self.require(a, b)?;
                let key = self.key(a, b);
                self.edges.insert(key, w);
            }
            Op::DeleteEdge(a, b) => {
                self.require(a, b)?;
                let key = self.key(a, b);
                self.edges.remove(&key);
            }
            Op::SetWeight(a, b, w) => {
                self.require(a, b)?;
                let key = self.key(a, b);
                match self.edges.get_mut(&key) {
                    Some(slot) => *slot = w,
                    None => return Err(GraphError::NotFound),
                }
            }
            Op::Recompact => {}
        }
        Ok(())
    }

    fn require(&self, a: u8, b: u8) -> Result<(), GraphError> {
        if self.nodes.contains(&a) && self.nodes.contains(&b) {
            Ok(())
        } else {
            Err(GraphError::NotFound)
        }
    }
}

fn apply(graph: &mut Graph<u8>, op: &Op) -> Result<(), GraphError> {
    match *op {
        Op::AddNode(v) => graph.add_node(v).map(|_| ()),
        Op::DeleteNode(v) => graph.delete_node(&v),
        Op::AddEdge(a, b, w) => graph.add_edge(&a, &b, w),
        Op::DeleteEdge(a, b) => graph.delete_edge(&a, &b).map(|_| ()),
        Op::SetWeight(a, b, w) => graph.set_weight(&a, &b, w),
        Op::Recompact => {
            graph.recompact();
            Ok(())
        }
    }
}

fn edge_set(graph: &Graph<u8>) -> BTreeMap<(u8, u8), f64> {
    graph
        .edges()
        .map(|e| {
            let a = *graph.value(e.source).unwrap();
            let b = *graph.value(e.target).unwrap();
            let key = if graph.is_directed() || a <= b { (a, b) } else { (b, a) };
            (key, e.weight)
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_matches_model(
        kind in arb_kind(),
        threshold in 1usize..6,
        ops in prop::collection::vec(arb_op(), 1..80),
    ) {
        let config = GraphConfig::new(kind)
            .with_compaction_threshold(NonZeroUsize::new(threshold));
        let mut graph = Graph::with_config(config);
        let mut model = Model { directed: kind.is_directed(), ..Model::default() };

        for op in &ops {
            let expected = model.apply(op);
            let actual = apply(&mut graph, op);
            prop_assert_eq!(expected.is_ok(), actual.is_ok(), "{:?}: {:?}", op, actual);
        }

        let values: BTreeSet<u8> = graph.nodes().map(|(_, v)| *v).collect();
        prop_assert_eq!(&values, &model.nodes);
        prop_assert_eq!(graph.num_nodes(), model.nodes.len());
        prop_assert_eq!(graph.num_edges(), model.edges.len());
        prop_assert_eq!(edge_set(&graph), model.edges);
        prop_assert!(graph.pending_deletions() < threshold);
    }

    #[test]
    fn prop_undirected_edges_are_symmetric(
        edges in prop::collection::vec((0u8..8, 0u8..8, -10.0f64..10.0), 0..40),
    ) {
        let mut graph = Graph::undirected();
        for v in 0u8..8 {
            graph.add_node(v).unwrap();
        }
        for &(a, b, w) in &edges {
            graph.add_edge(&a, &b, w).unwrap();
        }

        for a in 0u8..8 {
            for b in 0u8..8 {
                prop_assert_eq!(graph.is_adjacent(&a, &b).unwrap(), graph.is_adjacent(&b, &a).unwrap());
                prop_assert_eq!(graph.weight(&a, &b).unwrap(), graph.weight(&b, &a).unwrap());
            }
        }
    }

    #[test]
    fn prop_missing_edge_weight_is_sentinel(
        directed in any::<bool>(),
        a in 0u8..6,
        b in 0u8..6,
    ) {
        let kind = if directed { GraphKind::Directed } else { GraphKind::Undirected };
        let mut graph = Graph::new(kind);
        for v in 0u8..6 {
            graph.add_node(v).unwrap();
        }
        prop_assert_eq!(graph.weight(&a, &b).unwrap(), MAX_WEIGHT);

        graph.add_edge(&a, &b, 1.5).unwrap();
        graph.delete_edge(&a, &b).unwrap();
        prop_assert_eq!(graph.weight(&a, &b).unwrap(), MAX_WEIGHT);
    }

    #[test]
    fn prop_recompact_preserves_topology(
        kind in arb_kind(),
        edges in prop::collection::vec((0u8..10, 0u8..10, -5.0f64..5.0), 0..30),
        doomed in prop::collection::btree_set(0u8..10, 0..6),
    ) {
        let config = GraphConfig::new(kind).with_compaction_threshold(None);
        let mut graph = Graph::with_config(config);
        for v in 0u8..10 {
            graph.add_node(v).unwrap();
        }
        for &(a, b, w) in &edges {
            graph.add_edge(&a, &b, w).unwrap();
        }
        for v in &doomed {
            graph.delete_node(v).unwrap();
        }

        let nodes_before: Vec<u8> = graph.nodes().map(|(_, v)| *v).collect();
        let edges_before = edge_set(&graph);
        let count_before = graph.num_edges();

        graph.recompact();

        let nodes_after: Vec<u8> = graph.nodes().map(|(_, v)| *v).collect();
        prop_assert_eq!(nodes_after, nodes_before);
        prop_assert_eq!(edge_set(&graph), edges_before);
        prop_assert_eq!(graph.num_edges(), count_before);
        prop_assert_eq!(graph.slot_count(), graph.num_nodes());
        for (i, (handle, _)) in graph.nodes().enumerate() {
            prop_assert_eq!(handle.id().index(), i);
        }
    }

    #[test]
    fn prop_delete_node_twice_fails(v in 0u8..4) {
        let mut graph = Graph::directed();
        for x in 0u8..4 {
            graph.add_node(x).unwrap();
        }
        let handle = graph.find_node(&v).unwrap();
        graph.delete_node(handle).unwrap();

        prop_assert!(matches!(graph.delete_node(&v), Err(GraphError::NotFound)));
        let is_invalid = matches!(graph.delete_node(handle), Err(GraphError::InvalidHandle { .. }));
        prop_assert!(is_invalid);
    }
}
