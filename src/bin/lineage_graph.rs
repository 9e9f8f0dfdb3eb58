//! Lineage graph CLI
//!
//! Reads a lineage snapshot (JSON) on stdin and writes the rendered graph
//! (JSON) on stdout. Logs go to stderr.
//!
//! ## Configuration
//!
//! Arguments:
//! - `--feature-view <name>`: build the graph centred on one feature view
//!   from the snapshot's relationships
//! - `--no-synthesis`: drop edges to objects missing from the snapshot
//!   instead of synthesizing nodes for them
//! - `--no-layout-hints`: omit positioning edges
//! - `--pretty`: pretty-print the output
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (default: lineage_graph=info,feature_lineage=warn)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: pretty)
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin lineage_graph --features cli < snapshot.json > graph.json
//! ```

use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use feature_lineage::{
    build_feature_view_graph, BuilderOptions, LineageGraph, LineageGraphBuilder, LineageSnapshot,
    NoLayoutHints, SnapshotError,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Failed to encode graph: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Render a lineage snapshot from stdin as graph JSON on stdout.
#[derive(Debug, Parser)]
#[command(name = "lineage_graph", version, about)]
struct Args {
    /// Build the graph centred on this feature view.
    #[arg(long, value_name = "NAME")]
    feature_view: Option<String>,

    /// Drop edges to objects missing from the snapshot instead of
    /// synthesizing nodes for them.
    #[arg(long)]
    no_synthesis: bool,

    /// Omit positioning edges.
    #[arg(long)]
    no_layout_hints: bool,

    /// Pretty-print the output.
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn builder_options(&self) -> BuilderOptions {
        BuilderOptions {
            synthesize_missing_nodes: !self.no_synthesis,
        }
    }
}

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lineage_graph=info,feature_lineage=warn".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .flatten_event(true)
                    .with_writer(io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(io::stderr))
            .init();
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let snapshot = LineageSnapshot::from_json(&input)?;

    let graph: LineageGraph = match &args.feature_view {
        Some(name) => build_feature_view_graph(&snapshot.relationships, name),
        None if args.no_layout_hints => {
            LineageGraphBuilder::with_hints(args.builder_options(), NoLayoutHints).build(&snapshot)
        }
        None => LineageGraphBuilder::new()
            .options(args.builder_options())
            .build(&snapshot),
    };

    info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        fingerprint = %graph.fingerprint(),
        "graph built"
    );

    let mut stdout = io::stdout().lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut stdout, &graph)?;
    } else {
        serde_json::to_writer(&mut stdout, &graph)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "lineage_graph failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_build_full_graph() {
        let args = Args::try_parse_from(["lineage_graph"]).unwrap();
        assert!(args.feature_view.is_none());
        assert!(!args.no_layout_hints);
        assert!(!args.pretty);
        assert!(args.builder_options().synthesize_missing_nodes);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "lineage_graph",
            "--feature-view",
            "driver_hourly_stats",
            "--no-synthesis",
            "--no-layout-hints",
            "--pretty",
        ])
        .unwrap();
        assert_eq!(args.feature_view.as_deref(), Some("driver_hourly_stats"));
        assert!(!args.builder_options().synthesize_missing_nodes);
        assert!(args.no_layout_hints);
        assert!(args.pretty);
    }

    #[test]
    fn test_feature_view_needs_a_name() {
        assert!(Args::try_parse_from(["lineage_graph", "--feature-view"]).is_err());
        assert!(Args::try_parse_from(["lineage_graph", "--bogus"]).is_err());
    }
}
