//! Grid geometry: square addressing, layer distance and adjacency.

use crate::models::{BaseRegion, GridParams, LatLon, SquareBounds, SquareKey};
use serde::{Deserialize, Serialize};

/// Per-axis and total distance from a square to the Übersquadrat border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDistance {
    pub dist_i: u32,
    pub dist_j: u32,
    pub total: u32,
}

/// Bounds of square `key` as `[[south, west], [north, east]]`.
pub fn rect_from_ij(key: SquareKey, grid: &GridParams) -> SquareBounds {
    let south = grid.origin_lat + key.i as f64 * grid.lat_step;
    let west = grid.origin_lon + key.j as f64 * grid.lon_step;
    SquareBounds {
        south,
        west,
        north: south + grid.lat_step,
        east: west + grid.lon_step,
    }
}

pub fn square_center(key: SquareKey, grid: &GridParams) -> LatLon {
    LatLon {
        lat: grid.origin_lat + (key.i as f64 + 0.5) * grid.lat_step,
        lon: grid.origin_lon + (key.j as f64 + 0.5) * grid.lon_step,
    }
}

/// Square containing `point`. Points on a shared edge belong to the north/east square.
pub fn square_at(point: LatLon, grid: &GridParams) -> SquareKey {
    SquareKey {
        i: ((point.lat - grid.origin_lat) / grid.lat_step).floor() as i32,
        j: ((point.lon - grid.origin_lon) / grid.lon_step).floor() as i32,
    }
}

/// Layer distance of `key` from `base`.
///
/// Zero for squares inside the base and for every square one step outside it
/// (corners included); each axis contributes the number of full layers between
/// the square and the adjacent ring.
pub fn layer_distance(key: SquareKey, base: &BaseRegion) -> LayerDistance {
    let dist_i = axis_distance(key.i, base.min_i, base.max_i);
    let dist_j = axis_distance(key.j, base.min_j, base.max_j);
    LayerDistance {
        dist_i,
        dist_j,
        total: dist_i.saturating_add(dist_j),
    }
}

fn axis_distance(value: i32, min: i32, max: i32) -> u32 {
    // abs_diff is at least 1 on both outer branches
    if value < min {
        min.abs_diff(value) - 1
    } else if value > max {
        value.abs_diff(max) - 1
    } else {
        0
    }
}

/// True iff `key` sits in the ring directly around `base`, corners included.
pub fn is_on_border(key: SquareKey, base: &BaseRegion) -> bool {
    // Widened so the ring just past i32::MIN / i32::MAX needs no special case
    let (i, j) = (i64::from(key.i), i64::from(key.j));
    let (min_i, max_i) = (i64::from(base.min_i) - 1, i64::from(base.max_i) + 1);
    let (min_j, max_j) = (i64::from(base.min_j) - 1, i64::from(base.max_j) + 1);
    let in_i_span = (min_i..=max_i).contains(&i);
    let in_j_span = (min_j..=max_j).contains(&j);
    let on_row = i == min_i || i == max_i;
    let on_col = j == min_j || j == max_j;
    (on_row && in_j_span) || (on_col && in_i_span)
}

/// The edge-sharing neighbors in N, S, E, W order; none past the key range.
pub fn neighbors4(key: SquareKey) -> impl Iterator<Item = SquareKey> {
    [
        key.i.checked_add(1).map(|i| SquareKey::new(i, key.j)),
        key.i.checked_sub(1).map(|i| SquareKey::new(i, key.j)),
        key.j.checked_add(1).map(|j| SquareKey::new(key.i, j)),
        key.j.checked_sub(1).map(|j| SquareKey::new(key.i, j)),
    ]
    .into_iter()
    .flatten()
}

pub fn manhattan(a: SquareKey, b: SquareKey) -> u32 {
    a.i.abs_diff(b.i).saturating_add(a.j.abs_diff(b.j))
}

/// Every square of `region`, row-major (i ascending, then j ascending).
pub fn scan_region(region: &BaseRegion) -> impl Iterator<Item = SquareKey> {
    let (min_j, max_j) = (region.min_j, region.max_j);
    (region.min_i..=region.max_i)
        .flat_map(move |i| (min_j..=max_j).map(move |j| SquareKey::new(i, j)))
}
