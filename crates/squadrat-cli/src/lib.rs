//! Squadrat CLI - Command line tools for squadrat route planning.
//!
//! This crate provides the CLI binaries:
//! - plan_route: full pipeline from an input document and road file
//! - suggest_squares: square selection only
//! - demo_scenario: random history and street grid run through the pipeline

pub mod input;
pub mod output;
pub mod scenario;

pub use input::{check_document, load_input, load_roads, parse_roads, InputDocument};
pub use output::{write_json, Report};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr log subscriber; stdout is reserved for JSON output.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("squadrat=info".parse()?))
        .init();
    Ok(())
}
