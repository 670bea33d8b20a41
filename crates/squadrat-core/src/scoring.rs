//! Strategic value of a candidate square, shared by both optimizers.

use crate::grid::{layer_distance, neighbors4};
use crate::models::{BaseRegion, DirectionSet, OptimizationMode, SquareKey, VisitedSet};
use crate::region::{edge_completion, EdgeAnalysis, HoleAnalysis};
use serde::{Deserialize, Serialize};

pub const BASE_SCORE: f64 = 100.0;
pub const DIRECTION_VETO: f64 = -1_000_000.0;
pub const HOLE_COMPLETION_BONUS: f64 = 1500.0;
pub const EDGE_COMPLETION_FACTOR: f64 = 5.0;
/// Per visited neighbor, batch selection
pub const STRATEGIC_ADJACENCY_BONUS: f64 = 25.0;
/// Per visited neighbor, incremental routing rewards continuity harder
pub const ORIENTEERING_ADJACENCY_BONUS: f64 = 100.0;

/// Dominant term: border squares always beat distant ones.
pub fn layer_bonus(layer: u32) -> f64 {
    match layer {
        0 => 10_000.0,
        1 => 5_000.0,
        2 => 2_000.0,
        3 => 500.0,
        4 => -2_000.0,
        _ => -10_000.0,
    }
}

/// Points per hole square, shrinking for holes far from the border.
pub fn hole_size_multiplier(layer: u32) -> f64 {
    if layer >= 5 {
        200.0
    } else if layer >= 3 {
        400.0
    } else {
        800.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub layer: u32,
    pub layer_bonus: f64,
    pub edge_bonus: f64,
    pub hole_bonus: f64,
    pub adjacency_bonus: f64,
    pub vetoed: bool,
    pub total: f64,
}

/// A scored square outside the Übersquadrat.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub key: SquareKey,
    pub edges: DirectionSet,
    pub hole_id: Option<usize>,
    pub score: ScoreBreakdown,
}

/// Everything needed to score squares against one region snapshot.
pub struct ScoreContext<'a> {
    pub base: &'a BaseRegion,
    pub visited: &'a VisitedSet,
    pub edges: &'a [EdgeAnalysis; 4],
    pub holes: &'a HoleAnalysis,
    pub mode: OptimizationMode,
    pub directions: DirectionSet,
    pub adjacency_bonus: f64,
}

impl ScoreContext<'_> {
    pub fn candidate(&self, key: SquareKey) -> Candidate {
        let edges = DirectionSet::of_square(key, self.base);
        Candidate {
            key,
            edges,
            hole_id: self.holes.square_to_hole.get(&key).copied(),
            score: self.score(key, edges),
        }
    }

    fn score(&self, key: SquareKey, edges: DirectionSet) -> ScoreBreakdown {
        let layer = layer_distance(key, self.base).total;
        let layer_bonus = layer_bonus(layer);

        let max_completion = edges
            .iter()
            .map(|direction| edge_completion(self.edges, direction))
            .fold(0.0_f64, f64::max);
        let edge_bonus =
            (max_completion * EDGE_COMPLETION_FACTOR).floor() * self.mode.edge_multiplier();

        let hole_bonus = match self.holes.hole_of(key) {
            Some(hole) => {
                let remaining = hole
                    .squares
                    .iter()
                    .filter(|square| !self.visited.contains(square))
                    .count();
                let mut bonus = hole.size as f64 * hole_size_multiplier(layer);
                if remaining <= 1 {
                    bonus += HOLE_COMPLETION_BONUS;
                }
                bonus * self.mode.hole_multiplier()
            }
            None => 0.0,
        };

        let covered_neighbors = neighbors4(key)
            .filter(|neighbor| self.visited.contains(neighbor) || self.base.contains(*neighbor))
            .count();
        let adjacency_bonus = covered_neighbors as f64 * self.adjacency_bonus;

        let vetoed = !self.directions.permits(key, self.base);
        let mut total = BASE_SCORE + layer_bonus + edge_bonus + hole_bonus + adjacency_bonus;
        if vetoed {
            total += DIRECTION_VETO;
        }

        ScoreBreakdown {
            layer,
            layer_bonus,
            edge_bonus,
            hole_bonus,
            adjacency_bonus,
            vetoed,
            total,
        }
    }
}
