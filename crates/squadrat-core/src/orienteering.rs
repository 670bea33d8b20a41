//! Incremental square selection under a cycling distance budget.
//!
//! Each step picks the frontier square with the best blend of strategic value
//! and value per estimated kilometer, then continues from that square.

use crate::config::PlannerConfig;
use crate::grid::{layer_distance, rect_from_ij, scan_region, square_center};
use crate::models::{
    BaseRegion, DirectionSet, GridParams, LatLon, OptimizationMode, SelectedSquare, SquareKey,
    VisitedSet,
};
use crate::region::{analyze_edges, detect_holes, FloodFillLimits};
use crate::scoring::{ScoreContext, ORIENTEERING_ADJACENCY_BONUS};
use crate::spatial::distance_km;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const MIN_ROUTING_WEIGHT: f64 = 0.5;
pub const MAX_ROUTING_WEIGHT: f64 = 2.0;
/// Floor for leg estimates so efficiency never divides by zero.
pub const MIN_LEG_KM: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct OrienteeringParams {
    pub base: BaseRegion,
    pub max_distance_km: f64,
    /// 0.5 favors raw value, 2.0 favors value per kilometer
    pub routing_weight: f64,
    pub directions: DirectionSet,
    pub visited: VisitedSet,
    pub grid: GridParams,
    pub mode: OptimizationMode,
    pub max_hole_size: usize,
    pub start_point: Option<LatLon>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrienteeringStop {
    /// Next best square would exceed the distance budget
    BudgetExhausted,
    /// No eligible square within reach
    NoFrontier,
    IterationCap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrienteeringResult {
    /// Squares in riding order
    pub squares: Vec<SelectedSquare>,
    pub start: LatLon,
    pub total_distance_km: f64,
    pub iterations: usize,
    pub stop: OrienteeringStop,
}

#[derive(Debug, Clone, Copy)]
struct FrontierPick {
    key: SquareKey,
    layer: u32,
    strategic_score: f64,
    cycling_km: f64,
    final_score: f64,
}

/// Estimated road distance for a straight-line hop.
pub fn cycling_distance_km(from: LatLon, to: LatLon, road_indirection: f64) -> f64 {
    (distance_km(from, to) * road_indirection).max(MIN_LEG_KM)
}

/// Blend of raw strategic value and value per kilometer.
pub fn blended_score(strategic_score: f64, cycling_km: f64, routing_weight: f64) -> f64 {
    let weight = routing_weight.clamp(MIN_ROUTING_WEIGHT, MAX_ROUTING_WEIGHT);
    let efficiency = strategic_score / cycling_km.max(MIN_LEG_KM);
    efficiency * weight * 1000.0 + strategic_score * (2.0 - weight)
}

/// Build a route square by square until the budget, frontier or iteration cap runs out.
pub fn optimize_orienteering(
    params: &OrienteeringParams,
    config: &PlannerConfig,
) -> OrienteeringResult {
    let base = &params.base;
    let start = params
        .start_point
        .unwrap_or_else(|| base.center(&params.grid));
    let limits = FloodFillLimits {
        search_radius: config.hole_search_radius,
        max_cells: config.max_flood_fill_cells,
    };

    let mut visited = params.visited.clone();
    let mut position = start;
    let mut total_km = 0.0;
    let mut squares: Vec<SelectedSquare> = Vec::new();
    let mut iterations = 0usize;
    let mut stop = OrienteeringStop::IterationCap;

    while iterations < config.max_orienteering_iterations {
        let max_gap_km = if iterations == 0 {
            config.first_gap_km
        } else {
            config.gap_km
        };
        iterations += 1;

        let edges = analyze_edges(base, &visited);
        let holes = detect_holes(base, &visited, params.max_hole_size, limits);
        let ctx = ScoreContext {
            base,
            visited: &visited,
            edges: &edges,
            holes: &holes,
            mode: params.mode,
            directions: params.directions,
            adjacency_bonus: ORIENTEERING_ADJACENCY_BONUS,
        };

        let window = base.expanded(
            i32::try_from(config.frontier_max_layer)
                .unwrap_or(i32::MAX)
                .saturating_add(1),
        );
        let mut best: Option<FrontierPick> = None;
        let mut frontier_size = 0usize;

        for key in scan_region(&window) {
            if base.contains(key) || visited.contains(&key) {
                continue;
            }
            if layer_distance(key, base).total > config.frontier_max_layer {
                continue;
            }
            let center = square_center(key, &params.grid);
            if distance_km(position, center) > max_gap_km {
                continue;
            }
            let candidate = ctx.candidate(key);
            if candidate.score.vetoed {
                continue;
            }
            frontier_size += 1;

            let cycling_km = cycling_distance_km(position, center, config.road_indirection);
            let final_score =
                blended_score(candidate.score.total, cycling_km, params.routing_weight);
            if best.is_none_or(|pick| final_score > pick.final_score) {
                best = Some(FrontierPick {
                    key,
                    layer: candidate.score.layer,
                    strategic_score: candidate.score.total,
                    cycling_km,
                    final_score,
                });
            }
        }

        let Some(pick) = best else {
            stop = OrienteeringStop::NoFrontier;
            break;
        };

        if total_km + pick.cycling_km > params.max_distance_km {
            debug!(
                square = %pick.key,
                leg_km = pick.cycling_km,
                total_km,
                budget_km = params.max_distance_km,
                "next square exceeds budget"
            );
            stop = OrienteeringStop::BudgetExhausted;
            break;
        }

        debug!(
            square = %pick.key,
            frontier = frontier_size,
            strategic = pick.strategic_score,
            leg_km = pick.cycling_km,
            "committed square"
        );
        total_km += pick.cycling_km;
        position = square_center(pick.key, &params.grid);
        visited.insert(pick.key);
        squares.push(SelectedSquare {
            key: pick.key,
            bounds: rect_from_ij(pick.key, &params.grid),
            layer: pick.layer,
            score: pick.final_score,
        });
    }

    info!(
        selected = squares.len(),
        total_km,
        budget_km = params.max_distance_km,
        iterations,
        stop = ?stop,
        "orienteering route complete"
    );

    OrienteeringResult {
        squares,
        start,
        total_distance_km: total_km,
        iterations,
        stop,
    }
}
