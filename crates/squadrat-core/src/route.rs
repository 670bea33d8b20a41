//! Route ordering: nearest-neighbor construction with 2-opt improvement.

use crate::models::LatLon;
use crate::spatial::distance_km;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum gain (km) for a 2-opt exchange to count as an improvement.
const IMPROVEMENT_EPS_KM: f64 = 1e-9;

/// An ordered route through waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Start, visited points, and the start again for roundtrips
    pub points: Vec<LatLon>,
    /// Input indices of the visited points, in route order
    pub order: Vec<usize>,
    pub distance_km: f64,
    pub roundtrip: bool,
}

/// Sum of great-circle legs in kilometers.
pub fn calculate_route_distance(points: &[LatLon]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_km(pair[0], pair[1]))
        .sum()
}

/// Greedy tour from `start`: always ride to the closest unvisited point.
///
/// Equal distances keep the earlier input point.
pub fn nearest_neighbor(start: LatLon, points: &[LatLon], roundtrip: bool) -> Route {
    let order = nearest_neighbor_order(start, points);
    build_route(start, points, order, roundtrip)
}

fn nearest_neighbor_order(start: LatLon, points: &[LatLon]) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut order = Vec::with_capacity(points.len());
    let mut current = start;

    while !remaining.is_empty() {
        let mut best_pos = 0usize;
        let mut best_dist = f64::INFINITY;
        for (pos, index) in remaining.iter().enumerate() {
            let dist = distance_km(current, points[*index]);
            if dist < best_dist {
                best_dist = dist;
                best_pos = pos;
            }
        }
        let index = remaining.remove(best_pos);
        current = points[index];
        order.push(index);
    }

    order
}

fn build_route(start: LatLon, points: &[LatLon], order: Vec<usize>, roundtrip: bool) -> Route {
    let mut route_points = Vec::with_capacity(order.len() + 2);
    route_points.push(start);
    route_points.extend(order.iter().map(|index| points[*index]));
    if roundtrip {
        route_points.push(start);
    }
    Route {
        distance_km: calculate_route_distance(&route_points),
        points: route_points,
        order,
        roundtrip,
    }
}

/// Improve a route by reversing sub-paths while that shortens it.
///
/// The first and last points stay in place. Runs until a full pass finds no
/// improving exchange or `max_passes` passes are done.
pub fn two_opt_optimize(route: &[LatLon], max_passes: usize) -> Vec<LatLon> {
    let mut points = route.to_vec();
    let mut indices: Vec<usize> = (0..points.len()).collect();
    two_opt_in_place(&mut points, &mut indices, max_passes);
    points
}

/// 2-opt over `points`, applying every reversal to `tags` as well.
fn two_opt_in_place<T>(points: &mut [LatLon], tags: &mut [T], max_passes: usize) -> usize {
    let n = points.len();
    if n < 4 {
        return 0;
    }

    let mut passes = 0usize;
    while passes < max_passes {
        passes += 1;
        let mut improved = false;

        // Edges (i, i+1) and (j, j+1); reversing i+1..=j keeps 0 and n-1 fixed.
        for i in 0..n - 3 {
            for j in i + 2..n - 1 {
                let before = distance_km(points[i], points[i + 1])
                    + distance_km(points[j], points[j + 1]);
                let after =
                    distance_km(points[i], points[j]) + distance_km(points[i + 1], points[j + 1]);
                if after < before - IMPROVEMENT_EPS_KM {
                    points[i + 1..=j].reverse();
                    tags[i + 1..=j].reverse();
                    improved = true;
                }
            }
        }

        if !improved {
            break;
        }
    }

    passes
}

/// Nearest-neighbor tour refined by 2-opt.
pub fn solve_route(start: LatLon, points: &[LatLon], roundtrip: bool, max_passes: usize) -> Route {
    let initial = nearest_neighbor(start, points, roundtrip);
    let initial_km = initial.distance_km;

    // Tag every route slot with its input index; start slots carry None.
    let mut route_points = initial.points;
    let mut tags: Vec<Option<usize>> = Vec::with_capacity(route_points.len());
    tags.push(None);
    tags.extend(initial.order.iter().copied().map(Some));
    if roundtrip {
        tags.push(None);
    }

    let passes = two_opt_in_place(&mut route_points, &mut tags, max_passes);
    let distance = calculate_route_distance(&route_points);
    debug!(
        points = points.len(),
        initial_km,
        improved_km = distance,
        passes,
        "route solved"
    );

    Route {
        points: route_points,
        order: tags.into_iter().flatten().collect(),
        distance_km: distance,
        roundtrip,
    }
}

/// Join externally routed legs into one route.
///
/// A leg that starts where the previous one ended drops its duplicate first point.
pub fn stitch_legs(legs: &[Vec<LatLon>]) -> Route {
    let mut points: Vec<LatLon> = Vec::new();
    for leg in legs {
        let skip = match (points.last(), leg.first()) {
            (Some(last), Some(first)) if last == first => 1,
            _ => 0,
        };
        points.extend(leg.iter().skip(skip).copied());
    }
    let roundtrip = points.len() > 1 && points.first() == points.last();
    Route {
        distance_km: calculate_route_distance(&points),
        order: (0..legs.len()).collect(),
        points,
        roundtrip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64) -> LatLon {
        LatLon::new(lat, lon)
    }

    #[test]
    fn distance_of_empty_and_single_routes_is_zero() {
        assert_eq!(calculate_route_distance(&[]), 0.0);
        assert_eq!(calculate_route_distance(&[p(52.0, 13.0)]), 0.0);
    }

    #[test]
    fn tenth_of_a_degree_latitude_is_about_11_km() {
        let dist = calculate_route_distance(&[p(52.0, 13.0), p(52.1, 13.0)]);
        assert!((dist - 11.1).abs() < 11.1 * 0.05, "got {dist}");
    }

    #[test]
    fn nearest_neighbor_visits_each_point_once() {
        let start = p(0.0, 0.0);
        let points = vec![p(0.0, 0.3), p(0.0, 0.1), p(0.0, 0.2), p(0.0, -0.5)];
        let route = nearest_neighbor(start, &points, false);
        assert_eq!(route.order, vec![1, 2, 0, 3]);
        assert_eq!(route.points.len(), points.len() + 1);
        assert_eq!(route.points[0], start);

        let mut sorted = route.order.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
    }

    #[test]
    fn roundtrip_returns_to_start() {
        let start = p(0.0, 0.0);
        let points = vec![p(0.1, 0.0), p(0.1, 0.1)];
        let route = nearest_neighbor(start, &points, true);
        assert_eq!(route.points.first(), Some(&start));
        assert_eq!(route.points.last(), Some(&start));
        assert_eq!(route.points.len(), 4);
    }

    #[test]
    fn ties_keep_input_order() {
        let start = p(0.0, 0.0);
        let points = vec![p(0.0, 0.1), p(0.0, -0.1)];
        let route = nearest_neighbor(start, &points, false);
        assert_eq!(route.order[0], 0);
    }

    #[test]
    fn two_opt_untangles_crossing() {
        // start -> (1,1) -> (0,1) -> (1,0)... crossing path
        let route = vec![p(0.0, 0.0), p(0.1, 0.1), p(0.0, 0.1), p(0.1, 0.0), p(0.0, 0.0)];
        let before = calculate_route_distance(&route);
        let improved = two_opt_optimize(&route, 100);
        let after = calculate_route_distance(&improved);
        assert!(after < before);
        assert_eq!(improved.first(), route.first());
        assert_eq!(improved.last(), route.last());
        assert_eq!(improved.len(), route.len());
    }

    #[test]
    fn two_opt_never_lengthens_route() {
        let route: Vec<LatLon> = (0..12)
            .map(|k| {
                let angle = k as f64 * 2.3;
                p(50.0 + 0.05 * angle.sin(), 8.0 + 0.05 * (angle * 1.7).cos())
            })
            .collect();
        let before = calculate_route_distance(&route);
        let improved = two_opt_optimize(&route, 100);
        assert!(calculate_route_distance(&improved) <= before + 1e-12);
        assert_eq!(improved[0], route[0]);
        assert_eq!(improved[11], route[11]);
    }

    #[test]
    fn two_opt_leaves_short_routes_alone() {
        let route = vec![p(0.0, 0.0), p(0.1, 0.1), p(0.0, 0.1)];
        assert_eq!(two_opt_optimize(&route, 100), route);
    }

    #[test]
    fn solve_route_keeps_order_consistent_with_points() {
        let start = p(50.0, 8.0);
        let points: Vec<LatLon> = (0..9)
            .map(|k| {
                let angle = k as f64 * 1.9;
                p(50.0 + 0.03 * angle.cos(), 8.0 + 0.04 * angle.sin())
            })
            .collect();
        let nn = nearest_neighbor(start, &points, true);
        let solved = solve_route(start, &points, true, 100);

        assert!(solved.distance_km <= nn.distance_km + 1e-12);
        assert_eq!(solved.order.len(), points.len());
        for (slot, index) in solved.order.iter().enumerate() {
            assert_eq!(solved.points[slot + 1], points[*index]);
        }
        assert_eq!(solved.points.last(), Some(&start));
    }

    #[test]
    fn stitch_drops_duplicate_junctions() {
        let legs = vec![
            vec![p(0.0, 0.0), p(0.0, 0.05), p(0.0, 0.1)],
            vec![p(0.0, 0.1), p(0.05, 0.1)],
            vec![p(0.05, 0.1), p(0.0, 0.0)],
        ];
        let route = stitch_legs(&legs);
        assert_eq!(route.points.len(), 5);
        assert!(route.roundtrip);
        let expected: f64 = legs.iter().map(|leg| calculate_route_distance(leg)).sum();
        assert!((route.distance_km - expected).abs() < 1e-9);
    }
}
