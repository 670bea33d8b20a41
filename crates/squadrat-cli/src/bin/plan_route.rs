//! CLI tool to plan a squadrat expansion ride.
//!
//! Reads an input document (grid, visited squares, options) and an optional
//! road file, then prints the planned route as JSON.

use clap::Parser;
use squadrat_cli::{check_document, init_tracing, load_input, load_roads, write_json, Report};
use squadrat_core::plan_route;
use std::path::PathBuf;

/// Plan a ride through new squares around the Übersquadrat
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input document (JSON)
    #[arg(long)]
    input: PathBuf,

    /// Road lines: a JSON list of features or a GeoJSON FeatureCollection
    #[arg(long)]
    roads: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let doc = load_input(&args.input)?;
    check_document(&doc)?;
    let roads = match &args.roads {
        Some(path) => load_roads(path)?,
        None => Vec::new(),
    };
    let config = doc.planner_config();

    tracing::info!(
        approach = %doc.request.approach,
        visited = doc.request.visited.len(),
        roads = roads.len(),
        "planning route"
    );
    let plan = plan_route(&doc.request, &roads, &config)?;

    write_json(&Report::new(&plan), args.pretty)
}
