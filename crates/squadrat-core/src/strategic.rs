//! Batch selection of the next squares to ride, scored against the Übersquadrat.

use crate::config::PlannerConfig;
use crate::grid::{manhattan, rect_from_ij, scan_region};
use crate::models::{
    BaseRegion, DirectionSet, GridParams, OptimizationMode, SelectedSquare, VisitedSet,
};
use crate::region::{analyze_edges, detect_holes, EdgeAnalysis, FloodFillLimits, HoleAnalysis};
use crate::scoring::{Candidate, ScoreContext, HOLE_COMPLETION_BONUS, STRATEGIC_ADJACENCY_BONUS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Score lost per grid step between consecutive picks.
pub const DISTANCE_PENALTY_PER_STEP: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct StrategicParams {
    pub base: BaseRegion,
    pub target_count: usize,
    pub directions: DirectionSet,
    pub visited: VisitedSet,
    pub grid: GridParams,
    pub mode: OptimizationMode,
    pub max_hole_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategicStop {
    TargetReached,
    /// Fewer eligible squares than requested
    CandidatesExhausted,
    /// Nothing eligible within the search radius
    NoCandidates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicResult {
    pub squares: Vec<SelectedSquare>,
    pub edges: Vec<EdgeAnalysis>,
    pub holes: HoleAnalysis,
    pub candidates_considered: usize,
    pub stop: StrategicStop,
}

/// Pick up to `target_count` unvisited squares around the Übersquadrat.
///
/// The first pick is the best-scoring square; each later pick trades score
/// against grid distance from the previous pick, with a bonus for squares
/// that continue a hole already being filled.
pub fn optimize_strategic(params: &StrategicParams, config: &PlannerConfig) -> StrategicResult {
    let base = &params.base;
    let edges = analyze_edges(base, &params.visited);
    let holes = detect_holes(
        base,
        &params.visited,
        params.max_hole_size,
        FloodFillLimits {
            search_radius: config.hole_search_radius,
            max_cells: config.max_flood_fill_cells,
        },
    );

    let ctx = ScoreContext {
        base,
        visited: &params.visited,
        edges: &edges,
        holes: &holes,
        mode: params.mode,
        directions: params.directions,
        adjacency_bonus: STRATEGIC_ADJACENCY_BONUS,
    };
    let candidates = perimeter_candidates(&ctx, config.search_radius);
    let candidates_considered = candidates.len();

    let eligible: Vec<Candidate> = candidates
        .into_iter()
        .filter(|candidate| !candidate.score.vetoed)
        .collect();

    if eligible.is_empty() {
        info!(
            considered = candidates_considered,
            "no strategic candidates around Übersquadrat"
        );
        return StrategicResult {
            squares: Vec::new(),
            edges: edges.to_vec(),
            holes,
            candidates_considered,
            stop: StrategicStop::NoCandidates,
        };
    }

    let picks = select_greedy(&eligible, params.target_count);
    let stop = if picks.len() >= params.target_count {
        StrategicStop::TargetReached
    } else {
        StrategicStop::CandidatesExhausted
    };

    let squares: Vec<SelectedSquare> = picks
        .into_iter()
        .map(|index| {
            let candidate = &eligible[index];
            SelectedSquare {
                key: candidate.key,
                bounds: rect_from_ij(candidate.key, &params.grid),
                layer: candidate.score.layer,
                score: candidate.score.total,
            }
        })
        .collect();

    info!(
        selected = squares.len(),
        target = params.target_count,
        eligible = eligible.len(),
        holes = holes.holes.len(),
        "strategic selection complete"
    );

    StrategicResult {
        squares,
        edges: edges.to_vec(),
        holes,
        candidates_considered,
        stop,
    }
}

/// Unvisited squares outside `base` within `radius` layers, row-major.
fn perimeter_candidates(ctx: &ScoreContext<'_>, radius: i32) -> Vec<Candidate> {
    let window = ctx.base.expanded(radius.max(0));
    scan_region(&window)
        .filter(|key| !ctx.base.contains(*key) && !ctx.visited.contains(key))
        .map(|key| {
            let candidate = ctx.candidate(key);
            debug!(
                square = %candidate.key,
                layer = candidate.score.layer,
                score = candidate.score.total,
                "scored candidate"
            );
            candidate
        })
        .collect()
}

/// Indices into `candidates` in selection order.
fn select_greedy(candidates: &[Candidate], target_count: usize) -> Vec<usize> {
    let mut picks: Vec<usize> = Vec::with_capacity(target_count.min(candidates.len()));
    let mut taken = vec![false; candidates.len()];
    let mut selected_holes: HashSet<usize> = HashSet::new();

    while picks.len() < target_count {
        let last = picks.last().map(|index| candidates[*index].key);
        let mut best: Option<(usize, f64)> = None;

        for (index, candidate) in candidates.iter().enumerate() {
            if taken[index] {
                continue;
            }
            let value = match last {
                None => candidate.score.total,
                Some(last_key) => {
                    let mut value = candidate.score.total
                        - DISTANCE_PENALTY_PER_STEP * manhattan(candidate.key, last_key) as f64;
                    if candidate
                        .hole_id
                        .is_some_and(|id| selected_holes.contains(&id))
                    {
                        value += HOLE_COMPLETION_BONUS;
                    }
                    value
                }
            };
            if best.is_none_or(|(_, best_value)| value > best_value) {
                best = Some((index, value));
            }
        }

        let Some((index, _)) = best else {
            break;
        };
        taken[index] = true;
        if let Some(id) = candidates[index].hole_id {
            selected_holes.insert(id);
        }
        picks.push(index);
    }

    picks
}
