//! CLI tool to suggest the next squadrats to ride.
//!
//! Runs square selection only, without waypoints or route ordering.

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use squadrat_cli::{check_document, init_tracing, load_input, write_json, Report};
use squadrat_core::{analyze_edges, optimize, BaseRegion, EdgeAnalysis, OptimizationOutcome};
use std::path::PathBuf;

/// Suggest unvisited squares around the Übersquadrat
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input document (JSON)
    #[arg(long)]
    input: PathBuf,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Suggestion {
    base: BaseRegion,
    edges: [EdgeAnalysis; 4],
    #[serde(flatten)]
    outcome: OptimizationOutcome,
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let doc = load_input(&args.input)?;
    check_document(&doc)?;
    let config = doc.planner_config();
    let base = doc
        .request
        .resolve_base()
        .context("cannot determine the Übersquadrat")?;

    let outcome = optimize(&doc.request.optimize_request(base), &config);
    tracing::info!(
        approach = %outcome.approach,
        selected = outcome.squares.len(),
        stop = ?outcome.stop,
        "suggested squares"
    );

    let suggestion = Suggestion {
        base,
        edges: analyze_edges(&base, &doc.request.visited),
        outcome,
    };
    write_json(&Report::new(suggestion), args.pretty)
}
