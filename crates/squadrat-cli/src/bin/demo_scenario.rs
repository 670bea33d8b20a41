//! Demo Scenario - random riding history run through the full planner.
//!
//! 1. HISTORY: a covered square base with scattered visits around it
//! 2. STREETS: a jittered street grid covering the neighborhood
//! 3. PLAN: square selection, waypoint placement and route ordering
//!
//! Usage:
//!   cargo run -p squadrat-cli --bin demo_scenario -- --seed 7 --approach orienteering

use clap::{Parser, ValueEnum};
use squadrat_cli::scenario::random_scenario;
use squadrat_cli::{init_tracing, write_json, Report};
use squadrat_core::{find_ubersquadrat, plan_route, Approach, PlanRequest, PlannerConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ApproachArg {
    Strategic,
    Orienteering,
}

impl From<ApproachArg> for Approach {
    fn from(arg: ApproachArg) -> Self {
        match arg {
            ApproachArg::Strategic => Approach::Strategic,
            ApproachArg::Orienteering => Approach::Orienteering,
        }
    }
}

/// Demo: plan a ride on a random history
#[derive(Parser, Debug)]
#[command(author, version, about = "Demo: plan a squadrat ride on a random history")]
struct Args {
    /// Random seed for history and streets
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Side length of the covered base in squares
    #[arg(long, default_value_t = 6)]
    size: i32,

    /// Optimizer to run
    #[arg(long, value_enum, default_value_t = ApproachArg::Strategic)]
    approach: ApproachArg,

    /// Squares to select (strategic)
    #[arg(long, default_value_t = 10)]
    target: usize,

    /// Distance budget in km (orienteering)
    #[arg(long, default_value_t = 30.0)]
    budget_km: f64,

    /// Print the full plan as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let scenario = random_scenario(args.seed, args.size);
    let detected = find_ubersquadrat(&scenario.visited);
    tracing::info!(
        scenario = %scenario.name,
        visited = scenario.visited.len(),
        roads = scenario.roads.len(),
        detected = ?detected,
        "scenario ready"
    );

    let mut request = PlanRequest::new(args.approach.into(), scenario.grid, scenario.visited);
    request.base = Some(scenario.base);
    request.target_count = args.target;
    request.max_distance_km = args.budget_km;

    let plan = plan_route(&request, &scenario.roads, &PlannerConfig::from_env())?;

    if args.json {
        return write_json(&Report::new(&plan), true);
    }

    println!("Scenario {} ({} approach)", scenario.name, plan.approach);
    println!(
        "  Base: i {}..={}, j {}..={}",
        plan.base.min_i, plan.base.max_i, plan.base.min_j, plan.base.max_j
    );
    println!("  Stop: {:?}", plan.stop);
    println!();
    for (index, (square, waypoint)) in plan.squares.iter().zip(&plan.waypoints).enumerate() {
        println!(
            "[{:2}] square {:>8}  layer {}  {:?}{}  ({:.5}, {:.5})",
            index + 1,
            square.key.to_string(),
            square.layer,
            waypoint.kind,
            if waypoint.connecting { " (connecting)" } else { "" },
            waypoint.lat,
            waypoint.lon
        );
    }
    println!();
    println!(
        "Route: {} points, {:.1} km straight-line, profile {}",
        plan.route.points.len(),
        plan.route.distance_km,
        plan.profile
    );
    Ok(())
}
