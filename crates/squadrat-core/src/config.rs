//! Planner tunables with environment overrides.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Search bounds, iteration caps and distance heuristics shared by the optimizers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Layers around the Übersquadrat scanned for strategic candidates
    pub search_radius: i32,
    /// Layers around the Übersquadrat included in the hole flood fill
    pub hole_search_radius: i32,
    /// Upper bound on squares dequeued by one flood fill pass
    pub max_flood_fill_cells: usize,
    /// Deepest layer an orienteering frontier square may sit in
    pub frontier_max_layer: u32,
    /// Reach of the first orienteering step (km)
    pub first_gap_km: f64,
    /// Reach of every later orienteering step (km)
    pub gap_km: f64,
    /// Straight-line to road distance ratio
    pub road_indirection: f64,
    pub max_orienteering_iterations: usize,
    pub max_two_opt_passes: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            search_radius: 5,
            hole_search_radius: 5,
            max_flood_fill_cells: 20_000,
            frontier_max_layer: 2,
            first_gap_km: 30.0,
            gap_km: 10.0,
            road_indirection: 1.4,
            max_orienteering_iterations: 100,
            max_two_opt_passes: 100,
        }
    }
}

impl PlannerConfig {
    /// Defaults overridden by any `SQUADRAT_*` variable that parses.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            search_radius: env_or("SQUADRAT_SEARCH_RADIUS", defaults.search_radius),
            hole_search_radius: env_or("SQUADRAT_HOLE_SEARCH_RADIUS", defaults.hole_search_radius),
            max_flood_fill_cells: env_or(
                "SQUADRAT_MAX_FLOOD_FILL_CELLS",
                defaults.max_flood_fill_cells,
            ),
            frontier_max_layer: env_or("SQUADRAT_FRONTIER_MAX_LAYER", defaults.frontier_max_layer),
            first_gap_km: env_or("SQUADRAT_FIRST_GAP_KM", defaults.first_gap_km),
            gap_km: env_or("SQUADRAT_GAP_KM", defaults.gap_km),
            road_indirection: env_or("SQUADRAT_ROAD_INDIRECTION", defaults.road_indirection),
            max_orienteering_iterations: env_or(
                "SQUADRAT_MAX_ORIENTEERING_ITERATIONS",
                defaults.max_orienteering_iterations,
            ),
            max_two_opt_passes: env_or("SQUADRAT_MAX_TWO_OPT_PASSES", defaults.max_two_opt_passes),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
