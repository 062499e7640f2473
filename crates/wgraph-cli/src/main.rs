//! Weighted graph CLI.
//!
//! Provides the `wgraph` binary for inspecting and editing graphs stored as
//! JSON snapshots (see [`wgraph_core::GraphSnapshot`]). Node payloads are
//! strings. Query subcommands print JSON to stdout; editing subcommands
//! write the updated snapshot to `--output` and print a summary.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use wgraph_core::{
    Graph, GraphError, GraphSnapshot, DEFAULT_COMPACTION_THRESHOLD, DEFAULT_WEIGHT,
};

/// Inspect and edit weighted graph snapshots.
#[derive(Parser)]
#[command(name = "wgraph", about = "Inspect and edit weighted graph snapshots")]
struct Cli {
    /// Path to the graph snapshot (JSON).
    #[arg(short, long)]
    input: PathBuf,

    /// Pending deletions that trigger a compaction (0 disables).
    #[arg(long, default_value_t = DEFAULT_COMPACTION_THRESHOLD)]
    compaction_threshold: usize,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the graph kind and node/edge counts.
    Info,

    /// List node values.
    Nodes,

    /// List edges by endpoint value.
    Edges,

    /// List the neighbours of one node with edge weights.
    Neighbors {
        /// Node value.
        #[arg(short, long)]
        node: String,
    },

    /// Add a node.
    AddNode {
        /// Node value.
        #[arg(short, long)]
        node: String,

        /// Where to write the updated snapshot.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Add an edge, or overwrite the weight of an existing one.
    AddEdge {
        /// Source node value.
        #[arg(long)]
        from: String,

        /// Target node value.
        #[arg(long)]
        to: String,

        /// Edge weight (finite).
        #[arg(short, long, default_value_t = DEFAULT_WEIGHT, value_parser = parse_weight)]
        weight: f64,

        /// Where to write the updated snapshot.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Delete a node and its edges.
    RemoveNode {
        /// Node value.
        #[arg(short, long)]
        node: String,

        /// Where to write the updated snapshot.
        #[arg(short, long)]
        output: PathBuf,
    },
}

impl Commands {
    /// Destination of the updated snapshot, for editing subcommands.
    fn output(&self) -> Option<&Path> {
        match self {
            Commands::AddNode { output, .. }
            | Commands::AddEdge { output, .. }
            | Commands::RemoveNode { output, .. } => Some(output.as_path()),
            Commands::Info | Commands::Nodes | Commands::Edges | Commands::Neighbors { .. } => {
                None
            }
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read '{}': {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{}': {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Json(#[source] serde_json::Error),

    /// Well-formed JSON describing an impossible graph.
    #[error("invalid snapshot: {0}")]
    Snapshot(#[source] GraphError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl CliError {
    /// Exit code: 1 = graph error, 2 = invalid input, 3 = I/O error.
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Graph(GraphError::Serialization(_))
            | CliError::Json(_)
            | CliError::Snapshot(_) => 2,
            CliError::Graph(_) => 1,
            CliError::Read { .. } | CliError::Write { .. } => 3,
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let exit_code = match run(&cli) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the input, runs the subcommand and saves the result if it edits.
///
/// Returns the pretty-printed JSON to print on stdout.
fn run(cli: &Cli) -> Result<String, CliError> {
    let mut graph = load(&cli.input)?;
    graph.set_compaction_threshold(NonZeroUsize::new(cli.compaction_threshold));

    let output = execute(&mut graph, &cli.command)?;
    if let Some(path) = cli.command.output() {
        save(&graph, path)?;
    }

    serde_json::to_string_pretty(&output).map_err(|e| GraphError::from(e).into())
}

fn load(path: &Path) -> Result<Graph<String>, CliError> {
    let json = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let graph = parse(&json)?;

    tracing::debug!(
        path = %path.display(),
        nodes = graph.num_nodes(),
        edges = graph.num_edges(),
        "loaded snapshot"
    );
    Ok(graph)
}

/// Decodes and validates a snapshot. Every failure here is bad input.
fn parse(json: &str) -> Result<Graph<String>, CliError> {
    let snapshot: GraphSnapshot<String> = serde_json::from_str(json).map_err(CliError::Json)?;
    Graph::try_from(snapshot).map_err(CliError::Snapshot)
}

/// Clap value parser for `--weight`: a finite `f64`.
fn parse_weight(raw: &str) -> Result<f64, String> {
    let weight: f64 = raw
        .parse()
        .map_err(|e| format!("'{}' is not a number: {}", raw, e))?;
    if weight.is_finite() {
        Ok(weight)
    } else {
        Err(format!("weight must be finite, got {}", raw))
    }
}

fn save(graph: &Graph<String>, path: &Path) -> Result<(), CliError> {
    let json = graph.to_snapshot().to_json()?;
    fs::write(path, json).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), "wrote snapshot");
    Ok(())
}

/// Applies one subcommand to an in-memory graph and builds its JSON output.
fn execute(graph: &mut Graph<String>, command: &Commands) -> Result<Value, CliError> {
    let output = match command {
        Commands::Info => summary(graph),
        Commands::Nodes => {
            let values: Vec<&String> = graph.nodes().map(|(_, v)| v).collect();
            json!(values)
        }
        Commands::Edges => {
            let mut edges = Vec::with_capacity(graph.num_edges());
            for edge in graph.edges() {
                edges.push(json!({
                    "source": graph.value(edge.source)?,
                    "target": graph.value(edge.target)?,
                    "weight": edge.weight,
                }));
            }
            Value::Array(edges)
        }
        Commands::Neighbors { node } => {
            let neighbors: Vec<Value> = graph
                .neighbors(node)?
                .map(|adj| json!({ "node": adj.value, "weight": adj.weight }))
                .collect();
            json!(neighbors)
        }
        Commands::AddNode { node, .. } => {
            graph.add_node(node.clone())?;
            summary(graph)
        }
        Commands::AddEdge {
            from, to, weight, ..
        } => {
            graph.add_edge(from, to, *weight)?;
            summary(graph)
        }
        Commands::RemoveNode { node, .. } => {
            graph.delete_node(node)?;
            summary(graph)
        }
    };
    Ok(output)
}

fn summary(graph: &Graph<String>) -> Value {
    json!({
        "kind": graph.kind(),
        "nodes": graph.num_nodes(),
        "edges": graph.num_edges(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph<String> {
        let snapshot = GraphSnapshot::from_json(
            r#"{
                "kind": "undirected",
                "nodes": ["a", "b", "c"],
                "edges": [
                    { "source": 0, "target": 1, "weight": 1.5 },
                    { "source": 1, "target": 2, "weight": 2.0 }
                ]
            }"#,
        )
        .unwrap();
        Graph::try_from(snapshot).unwrap()
    }

    #[test]
    fn info_reports_counts() {
        let mut graph = sample();
        let out = execute(&mut graph, &Commands::Info).unwrap();
        assert_eq!(out, json!({ "kind": "undirected", "nodes": 3, "edges": 2 }));
    }

    #[test]
    fn edges_are_listed_by_value() {
        let mut graph = sample();
        let out = execute(&mut graph, &Commands::Edges).unwrap();
        assert_eq!(
            out,
            json!([
                { "source": "a", "target": "b", "weight": 1.5 },
                { "source": "b", "target": "c", "weight": 2.0 }
            ])
        );
    }

    #[test]
    fn neighbors_of_middle_node() {
        let mut graph = sample();
        let command = Commands::Neighbors {
            node: "b".to_string(),
        };
        let out = execute(&mut graph, &command).unwrap();
        assert_eq!(
            out,
            json!([
                { "node": "a", "weight": 1.5 },
                { "node": "c", "weight": 2.0 }
            ])
        );
    }

    #[test]
    fn remove_node_drops_its_edges() {
        let mut graph = sample();
        let command = Commands::RemoveNode {
            node: "b".to_string(),
            output: PathBuf::from("unused.json"),
        };
        let out = execute(&mut graph, &command).unwrap();
        assert_eq!(out["nodes"], 2);
        assert_eq!(out["edges"], 0);

        let nodes = execute(&mut graph, &Commands::Nodes).unwrap();
        assert_eq!(nodes, json!(["a", "c"]));
    }

    #[test]
    fn add_edge_between_existing_nodes() {
        let mut graph = sample();
        let command = Commands::AddEdge {
            from: "c".to_string(),
            to: "a".to_string(),
            weight: 4.0,
            output: PathBuf::from("unused.json"),
        };
        execute(&mut graph, &command).unwrap();
        assert_eq!(graph.weight(&"a".to_string(), &"c".to_string()).unwrap(), 4.0);
    }

    #[test]
    fn unknown_node_is_a_graph_error() {
        let mut graph = sample();
        let command = Commands::Neighbors {
            node: "zzz".to_string(),
        };
        match execute(&mut graph, &command) {
            Err(e) => {
                assert!(matches!(e, CliError::Graph(GraphError::NotFound)));
                assert_eq!(e.exit_code(), 1);
            }
            Ok(v) => panic!("expected NotFound, got {}", v),
        }
    }

    #[test]
    fn exit_codes_by_error_class() {
        let io = CliError::Read {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(io.exit_code(), 3);

        let bad_json = serde_json::from_str::<GraphSnapshot<String>>("[").unwrap_err();
        assert_eq!(CliError::Json(bad_json).exit_code(), 2);

        let bad_weight = CliError::from(GraphError::InvalidWeight { weight: f64::NAN });
        assert_eq!(bad_weight.exit_code(), 1);
    }

    #[test]
    fn snapshot_that_fails_validation_is_invalid_input() {
        let cases = [
            r#"{"kind":"directed","nodes":["a","a"],"edges":[]}"#,
            r#"{"kind":"directed","nodes":["a"],"edges":[{"source":0,"target":5,"weight":1.0}]}"#,
            r#"{"kind":"undirected","nodes":["a","b"],"edges":[{"source":3,"target":0,"weight":1.0}]}"#,
        ];
        for json in cases {
            match parse(json) {
                Err(e) => {
                    assert!(matches!(e, CliError::Snapshot(_)), "{}: {:?}", json, e);
                    assert_eq!(e.exit_code(), 2);
                }
                Ok(_) => panic!("expected an invalid snapshot: {}", json),
            }
        }
    }

    #[test]
    fn malformed_json_is_invalid_input() {
        match parse("{\"kind\":") {
            Err(e) => {
                assert!(matches!(e, CliError::Json(_)));
                assert_eq!(e.exit_code(), 2);
            }
            Ok(_) => panic!("expected malformed JSON"),
        }
    }

    #[test]
    fn non_finite_weight_is_rejected_by_the_parser() {
        assert_eq!(parse_weight("2.5"), Ok(2.5));
        assert!(parse_weight("NaN").is_err());
        assert!(parse_weight("inf").is_err());
        assert!(parse_weight("heavy").is_err());

        let result = Cli::try_parse_from([
            "wgraph", "--input", "g.json", "add-edge", "--from", "a", "--to", "b", "--weight",
            "NaN", "--output", "out.json",
        ]);
        match result {
            Err(e) => assert_eq!(e.exit_code(), 2),
            Ok(_) => panic!("expected NaN weight to be rejected"),
        }
    }

    #[test]
    fn only_edits_have_an_output() {
        assert!(Commands::Info.output().is_none());
        let command = Commands::AddNode {
            node: "d".to_string(),
            output: PathBuf::from("out.json"),
        };
        assert_eq!(command.output(), Some(Path::new("out.json")));
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "wgraph",
            "--input",
            "g.json",
            "--compaction-threshold",
            "0",
            "add-edge",
            "--from",
            "a",
            "--to",
            "b",
            "--output",
            "out.json",
        ])
        .unwrap();
        assert_eq!(cli.compaction_threshold, 0);
        match cli.command {
            Commands::AddEdge { weight, .. } => assert_eq!(weight, DEFAULT_WEIGHT),
            _ => panic!("expected add-edge"),
        }
    }
}
