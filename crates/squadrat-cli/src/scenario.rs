//! Synthetic riding histories and street networks for demos.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use squadrat_core::grid::{layer_distance, scan_region};
use squadrat_core::{BaseRegion, GridParams, RoadFeature, VisitedSet};

/// Roughly 1.1 km squares around Munich.
pub const DEMO_GRID: GridParams = GridParams {
    lat_step: 0.01,
    lon_step: 0.015,
    origin_lat: 48.05,
    origin_lon: 11.45,
};

/// Layers around the base that may hold scattered visited squares.
const HISTORY_SPREAD: i32 = 4;
/// Chance that a layer-0 square was visited; halves per layer.
const BORDER_VISIT_CHANCE: f64 = 0.6;
/// Chance that a grid row or column carries a street.
const STREET_CHANCE: f64 = 0.85;

/// A named planning situation.
pub struct Scenario {
    pub name: String,
    pub grid: GridParams,
    pub base: BaseRegion,
    pub visited: VisitedSet,
    pub roads: Vec<RoadFeature>,
}

/// Fully covered `size` x `size` base with a thinning ring of visits and a jittered street grid.
pub fn random_scenario(seed: u64, size: i32) -> Scenario {
    let mut rng = StdRng::seed_from_u64(seed);
    let size = size.max(1);
    let base = BaseRegion {
        min_i: 0,
        max_i: size - 1,
        min_j: 0,
        max_j: size - 1,
    };

    let mut visited: VisitedSet = scan_region(&base).collect();
    for key in scan_region(&base.expanded(HISTORY_SPREAD)) {
        if base.contains(key) {
            continue;
        }
        let layer = layer_distance(key, &base).total as i32;
        let chance = BORDER_VISIT_CHANCE * 0.5_f64.powi(layer);
        if rng.random_bool(chance) {
            visited.insert(key);
        }
    }

    let roads = street_grid(&mut rng, base.expanded(HISTORY_SPREAD + 1), &DEMO_GRID);

    Scenario {
        name: format!("random-{seed}"),
        grid: DEMO_GRID,
        base,
        visited,
        roads,
    }
}

/// Wavy east-west and north-south streets, at most one per row and column.
pub fn street_grid<R: Rng>(rng: &mut R, window: BaseRegion, grid: &GridParams) -> Vec<RoadFeature> {
    let outer = window.bounds(grid);
    let mut roads = Vec::new();

    for i in window.min_i..=window.max_i {
        if !rng.random_bool(STREET_CHANCE) {
            continue;
        }
        let south = grid.origin_lat + i as f64 * grid.lat_step;
        let mut lat = || south + grid.lat_step * rng.random_range(0.2..0.8);
        let mid_lon = (outer.west + outer.east) / 2.0;
        let mut road = RoadFeature::new(vec![
            [outer.west, lat()],
            [mid_lon, lat()],
            [outer.east, lat()],
        ]);
        road.id = Some(format!("street-row-{i}"));
        roads.push(road);
    }

    for j in window.min_j..=window.max_j {
        if !rng.random_bool(STREET_CHANCE) {
            continue;
        }
        let west = grid.origin_lon + j as f64 * grid.lon_step;
        let mut lon = || west + grid.lon_step * rng.random_range(0.2..0.8);
        let mid_lat = (outer.south + outer.north) / 2.0;
        let mut road = RoadFeature::new(vec![
            [lon(), outer.south],
            [lon(), mid_lat],
            [lon(), outer.north],
        ]);
        road.id = Some(format!("street-col-{j}"));
        roads.push(road);
    }

    roads
}
