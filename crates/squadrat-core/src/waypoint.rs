//! Waypoint placement on road geometry inside selected squares.
//!
//! Candidates come from three sources, ranked by priority tier:
//!
//! | source                          | tier | on connecting road |
//! |---------------------------------|------|--------------------|
//! | crossing of two distinct roads  | 3    | 5                  |
//! | midpoint of a clipped road part | 2    | 4                  |
//! | road point nearest the center   | 1    | 3.5                |
//!
//! A road is connecting when its full geometry also enters the next square of
//! the route. Ties within a tier go to the candidate closest to the previous
//! and next route points. A candidate within [`MIN_CANDIDATE_SPACING_M`] of a
//! better-ranked one is dropped, so alternatives are always distinct places.

use crate::clip::clip_line_string;
use crate::grid::{rect_from_ij, square_center};
use crate::models::{
    GridParams, LatLon, RoadFeature, SquareBounds, SquareKey, Waypoint, WaypointCandidate,
    WaypointKind,
};
use crate::spatial::{haversine_distance, LocalFrame};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{
    Closest, ClosestPoint, Coord, Intersects, LineInterpolatePoint, LineString, MapCoords,
    MultiLineString, Point,
};
use tracing::debug;

pub const INTERSECTION_PRIORITY: f64 = 3.0;
pub const CONNECTING_INTERSECTION_PRIORITY: f64 = 5.0;
pub const MIDPOINT_PRIORITY: f64 = 2.0;
pub const CONNECTING_MIDPOINT_PRIORITY: f64 = 4.0;
pub const NEAREST_PRIORITY: f64 = 1.0;
pub const CONNECTING_NEAREST_PRIORITY: f64 = 3.5;
pub const MAX_ALTERNATIVES: usize = 2;
/// Candidates closer than this (meters) to a better-ranked one are duplicates.
pub const MIN_CANDIDATE_SPACING_M: f64 = 0.5;

/// Neighbors of a square along the route, when known.
#[derive(Debug, Clone, Copy, Default)]
struct RouteContext {
    previous: Option<LatLon>,
    next: Option<LatLon>,
    next_bounds: Option<SquareBounds>,
}

/// Road parts inside one square, in the square's local meter frame.
struct ClippedRoad {
    pieces: MultiLineString<f64>,
    connecting: bool,
}

/// A candidate with its projected position, kept for spacing checks.
#[derive(Debug, Clone, Copy)]
struct Placed {
    xy: Coord<f64>,
    candidate: WaypointCandidate,
}

/// Place one waypoint per square without knowledge of the visiting order.
pub fn place_waypoints(
    squares: &[SquareKey],
    roads: &[RoadFeature],
    grid: &GridParams,
) -> Vec<Waypoint> {
    let lines = prepare_roads(roads);
    squares
        .iter()
        .map(|key| place_in_square(*key, &lines, grid, RouteContext::default()))
        .collect()
}

/// Place waypoints for squares already in riding order.
///
/// Each square sees the previously placed waypoint (or `start`) and the next
/// square, so placement favors roads that carry the route onward.
pub fn place_waypoints_sequenced(
    ordered: &[SquareKey],
    roads: &[RoadFeature],
    grid: &GridParams,
    start: LatLon,
    roundtrip: bool,
) -> Vec<Waypoint> {
    let lines = prepare_roads(roads);
    let mut previous = start;
    let mut waypoints = Vec::with_capacity(ordered.len());

    for (index, key) in ordered.iter().enumerate() {
        let next_key = ordered.get(index + 1);
        let next = match next_key {
            Some(next_key) => Some(square_center(*next_key, grid)),
            None if roundtrip => Some(start),
            None => None,
        };
        let ctx = RouteContext {
            previous: Some(previous),
            next,
            next_bounds: next_key.map(|next_key| rect_from_ij(*next_key, grid)),
        };
        let waypoint = place_in_square(*key, &lines, grid, ctx);
        previous = waypoint.point();
        waypoints.push(waypoint);
    }

    waypoints
}

/// Usable road lines in lon/lat; malformed ones are logged and dropped.
fn prepare_roads(roads: &[RoadFeature]) -> Vec<LineString<f64>> {
    roads
        .iter()
        .enumerate()
        .filter_map(|(index, road)| match road.to_line_string() {
            Ok(line) => Some(line),
            Err(err) => {
                debug!(road = index, id = ?road.id, error = %err, "skipping road geometry");
                None
            }
        })
        .collect()
}

fn place_in_square(
    key: SquareKey,
    lines: &[LineString<f64>],
    grid: &GridParams,
    ctx: RouteContext,
) -> Waypoint {
    let bounds = rect_from_ij(key, grid);
    let rect = bounds.to_rect();
    let center = bounds.center();
    let frame = LocalFrame::new(center);
    let next_rect = ctx.next_bounds.map(|next_bounds| next_bounds.to_rect());

    let clipped: Vec<ClippedRoad> = lines
        .iter()
        .filter_map(|line| {
            let pieces = clip_line_string(line, &rect);
            if pieces.is_empty() {
                return None;
            }
            Some(ClippedRoad {
                pieces: pieces
                    .iter()
                    .map(|piece| piece.map_coords(|c| frame.project(c)))
                    .collect(),
                connecting: next_rect.is_some_and(|next_rect| line.intersects(&next_rect)),
            })
        })
        .collect();

    if clipped.is_empty() {
        // A road lying only on the boundary touches the square but has no inside part
        let kind = if lines.iter().any(|line| line.intersects(&rect)) {
            WaypointKind::CenterFallback
        } else {
            WaypointKind::NoRoad
        };
        debug!(square = %key, ?kind, "no road runs through square");
        return center_waypoint(key, center, kind);
    }

    let mut candidates = Vec::new();
    collect_intersections(&clipped, &frame, &mut candidates);
    collect_midpoints(&clipped, &frame, &mut candidates);
    collect_nearest(&clipped, &frame, &mut candidates);

    rank_candidates(&mut candidates, center, &ctx);
    let generated = candidates.len();
    let candidates = drop_near_duplicates(candidates);

    let Some(best) = candidates.first().map(|placed| placed.candidate) else {
        debug!(square = %key, roads = clipped.len(), "no usable road point");
        return center_waypoint(key, center, WaypointKind::CenterFallback);
    };
    debug!(
        square = %key,
        kind = ?best.kind,
        priority = best.priority,
        candidates = candidates.len(),
        duplicates = generated - candidates.len(),
        "placed waypoint"
    );

    Waypoint {
        lat: best.lat,
        lon: best.lon,
        square: key,
        kind: best.kind,
        priority: best.priority,
        connecting: best.connecting,
        alternatives: candidates
            .iter()
            .skip(1)
            .take(MAX_ALTERNATIVES)
            .map(|placed| placed.candidate)
            .collect(),
    }
}

fn center_waypoint(key: SquareKey, center: LatLon, kind: WaypointKind) -> Waypoint {
    Waypoint {
        lat: center.lat,
        lon: center.lon,
        square: key,
        kind,
        priority: 0.0,
        connecting: false,
        alternatives: Vec::new(),
    }
}

fn placed(
    frame: &LocalFrame,
    xy: Coord<f64>,
    kind: WaypointKind,
    priority: f64,
    connecting: bool,
) -> Placed {
    let point = frame.unproject(xy);
    Placed {
        xy,
        candidate: WaypointCandidate {
            lat: point.lat,
            lon: point.lon,
            kind,
            priority,
            connecting,
        },
    }
}

fn collect_intersections(roads: &[ClippedRoad], frame: &LocalFrame, out: &mut Vec<Placed>) {
    for (a_index, road_a) in roads.iter().enumerate() {
        for road_b in &roads[a_index + 1..] {
            let connecting = road_a.connecting || road_b.connecting;
            let priority = if connecting {
                CONNECTING_INTERSECTION_PRIORITY
            } else {
                INTERSECTION_PRIORITY
            };
            for piece_a in &road_a.pieces {
                for piece_b in &road_b.pieces {
                    for seg_a in piece_a.lines() {
                        for seg_b in piece_b.lines() {
                            // Collinear overlaps have no single crossing point
                            if let Some(LineIntersection::SinglePoint { intersection, .. }) =
                                line_intersection(seg_a, seg_b)
                            {
                                out.push(placed(
                                    frame,
                                    intersection,
                                    WaypointKind::Intersection,
                                    priority,
                                    connecting,
                                ));
                            }
                        }
                    }
                }
            }
        }
    }
}

fn collect_midpoints(roads: &[ClippedRoad], frame: &LocalFrame, out: &mut Vec<Placed>) {
    for road in roads {
        let priority = if road.connecting {
            CONNECTING_MIDPOINT_PRIORITY
        } else {
            MIDPOINT_PRIORITY
        };
        for piece in &road.pieces {
            if let Some(point) = piece.line_interpolate_point(0.5) {
                out.push(placed(
                    frame,
                    point.0,
                    WaypointKind::Midpoint,
                    priority,
                    road.connecting,
                ));
            }
        }
    }
}

fn collect_nearest(roads: &[ClippedRoad], frame: &LocalFrame, out: &mut Vec<Placed>) {
    // The frame is centered on the square, so the center projects to the origin.
    let origin = Point::new(0.0, 0.0);
    for road in roads {
        let nearest = match road.pieces.closest_point(&origin) {
            Closest::Intersection(point) | Closest::SinglePoint(point) => point,
            Closest::Indeterminate => continue,
        };
        let priority = if road.connecting {
            CONNECTING_NEAREST_PRIORITY
        } else {
            NEAREST_PRIORITY
        };
        out.push(placed(
            frame,
            nearest.0,
            WaypointKind::Nearest,
            priority,
            road.connecting,
        ));
    }
}

/// Priority descending, then route detour ascending. Stable for exact ties.
fn rank_candidates(candidates: &mut [Placed], center: LatLon, ctx: &RouteContext) {
    let anchors: Vec<LatLon> = [ctx.previous, ctx.next].into_iter().flatten().collect();
    let detour = |placed: &Placed| -> f64 {
        let point = placed.candidate.point();
        if anchors.is_empty() {
            return haversine_distance(point.lat, point.lon, center.lat, center.lon);
        }
        anchors
            .iter()
            .map(|anchor| haversine_distance(point.lat, point.lon, anchor.lat, anchor.lon))
            .sum()
    };

    candidates.sort_by(|a, b| {
        b.candidate
            .priority
            .total_cmp(&a.candidate.priority)
            .then_with(|| detour(a).total_cmp(&detour(b)))
    });
}

/// Keep ranked candidates that are at least [`MIN_CANDIDATE_SPACING_M`] from every better one.
fn drop_near_duplicates(ranked: Vec<Placed>) -> Vec<Placed> {
    let mut kept: Vec<Placed> = Vec::with_capacity(ranked.len());
    for placed in ranked {
        let distinct = kept.iter().all(|better| {
            let gap = better.xy - placed.xy;
            gap.x.hypot(gap.y) >= MIN_CANDIDATE_SPACING_M
        });
        if distinct {
            kept.push(placed);
        }
    }
    kept
}
