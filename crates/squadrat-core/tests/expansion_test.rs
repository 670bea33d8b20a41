//! Square selection integration tests.
//!
//! Exercises region analysis, scoring and both optimizers through the public API.

use squadrat_core::grid::{layer_distance, scan_region};
use squadrat_core::region::FloodFillLimits;
use squadrat_core::scoring::{ScoreContext, STRATEGIC_ADJACENCY_BONUS};
use squadrat_core::{
    analyze_edges, detect_holes, optimize, Approach, BaseRegion, Direction, GridParams,
    OptimizeRequest, PlannerConfig, SquareKey, VisitedSet,
};
use std::collections::HashSet;

fn grid() -> GridParams {
    GridParams::new(0.01, 0.015, 51.0, 7.0)
}

fn base() -> BaseRegion {
    BaseRegion::new(0, 3, 0, 3).unwrap()
}

/// Test that five squares are picked on the first layer around an empty-history base.
#[test]
fn test_strategic_picks_five_border_squares() {
    let mut request = OptimizeRequest::new(Approach::Strategic, base(), grid(), VisitedSet::new());
    request.target_count = 5;
    let outcome = optimize(&request, &PlannerConfig::default());

    assert_eq!(outcome.squares.len(), 5);
    let unique: HashSet<SquareKey> = outcome.squares.iter().map(|sq| sq.key).collect();
    assert_eq!(unique.len(), 5);
    for square in &outcome.squares {
        assert!(!base().contains(square.key), "{} inside base", square.key);
        assert_eq!(square.layer, 0);
        assert_eq!(layer_distance(square.key, &base()).total, 0);
    }
}

/// Test that the first layer always outscores deeper layers.
#[test]
fn test_layer_zero_outscores_outer_layers() {
    let base = base();
    let visited = VisitedSet::new();
    let edges = analyze_edges(&base, &visited);
    let holes = detect_holes(&base, &visited, 10, FloodFillLimits::default());
    let ctx = ScoreContext {
        base: &base,
        visited: &visited,
        edges: &edges,
        holes: &holes,
        mode: Default::default(),
        directions: Default::default(),
        adjacency_bonus: STRATEGIC_ADJACENCY_BONUS,
    };

    let layer_zero = [SquareKey::new(4, 1), SquareKey::new(-1, -1), SquareKey::new(2, 4)];
    let outer = [SquareKey::new(5, 1), SquareKey::new(-3, -3), SquareKey::new(2, 7)];
    for near in layer_zero {
        for far in outer {
            let near_score = ctx.candidate(near).score.total;
            let far_score = ctx.candidate(far).score.total;
            assert!(near_score > far_score, "{near} ({near_score}) <= {far} ({far_score})");
        }
    }
}

/// Test that a direction filter keeps every selection beyond that side.
#[test]
fn test_north_filter_only_selects_north() {
    let mut request = OptimizeRequest::new(Approach::Strategic, base(), grid(), VisitedSet::new());
    request.target_count = 8;
    request.directions = [Direction::North].into_iter().collect();
    let outcome = optimize(&request, &PlannerConfig::default());

    assert_eq!(outcome.squares.len(), 8);
    assert!(outcome.squares.iter().all(|sq| sq.key.i > base().max_i));
}

/// Test that a single enclosed gap becomes a size-one hole and big gaps are dropped.
#[test]
fn test_isolated_gap_is_a_hole() {
    let gap = SquareKey::new(-1, 1);
    let mut visited: VisitedSet = scan_region(&base().expanded(2)).collect();
    visited.remove(&gap);

    let holes = detect_holes(&base(), &visited, 10, FloodFillLimits::default());
    let hole = holes.hole_of(gap).expect("gap should be a hole");
    assert_eq!(hole.size, 1);
    assert_eq!(hole.squares, vec![gap]);
    assert_eq!(holes.holes.len(), 1);
    assert!(holes.discarded_components >= 1);
}

/// Test that the orienteering budget holds across a range of budgets.
#[test]
fn test_orienteering_budget_is_respected() {
    let visited: VisitedSet = scan_region(&base()).collect();
    for budget in [1.0, 3.5, 8.0, 25.0, 60.0] {
        let mut request =
            OptimizeRequest::new(Approach::Orienteering, base(), grid(), visited.clone());
        request.max_distance_km = budget;
        let outcome = optimize(&request, &PlannerConfig::default());
        let distance = outcome.distance_km.unwrap();
        assert!(distance <= budget, "budget {budget} exceeded by {distance}");
        for square in &outcome.squares {
            assert!(!visited.contains(&square.key));
        }
    }
}
