//! End-to-end planning: square selection, waypoint placement and route ordering.

use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::models::{
    Approach, BaseRegion, BikeType, DirectionSet, GridParams, LatLon, OptimizationMode,
    RoadFeature, SelectedSquare, SquareKey, VisitedSet, Waypoint,
};
use crate::optimizer::{
    optimize, OptimizationStop, OptimizeRequest, DEFAULT_MAX_DISTANCE_KM, DEFAULT_MAX_HOLE_SIZE,
    DEFAULT_ROUTING_WEIGHT, DEFAULT_TARGET_COUNT,
};
use crate::route::{calculate_route_distance, solve_route, Route};
use crate::ubersquadrat::find_ubersquadrat;
use crate::waypoint::{place_waypoints, place_waypoints_sequenced};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Everything needed to plan one ride.
///
/// Without `base` the Übersquadrat is detected from `visited`. Without `start`
/// the ride begins at the Übersquadrat center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub grid: GridParams,
    #[serde(default)]
    pub visited: VisitedSet,
    #[serde(default)]
    pub base: Option<BaseRegion>,
    #[serde(default)]
    pub approach: Approach,
    #[serde(default = "default_target_count")]
    pub target_count: usize,
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
    #[serde(default = "default_routing_weight")]
    pub routing_weight: f64,
    #[serde(default = "DirectionSet::all")]
    pub directions: DirectionSet,
    #[serde(default)]
    pub mode: OptimizationMode,
    #[serde(default = "default_max_hole_size")]
    pub max_hole_size: usize,
    #[serde(default)]
    pub start: Option<LatLon>,
    #[serde(default)]
    pub bike_type: BikeType,
    #[serde(default = "default_roundtrip")]
    pub roundtrip: bool,
}

fn default_target_count() -> usize {
    DEFAULT_TARGET_COUNT
}

fn default_max_distance_km() -> f64 {
    DEFAULT_MAX_DISTANCE_KM
}

fn default_routing_weight() -> f64 {
    DEFAULT_ROUTING_WEIGHT
}

fn default_max_hole_size() -> usize {
    DEFAULT_MAX_HOLE_SIZE
}

fn default_roundtrip() -> bool {
    true
}

impl PlanRequest {
    pub fn new(approach: Approach, grid: GridParams, visited: VisitedSet) -> Self {
        Self {
            grid,
            visited,
            base: None,
            approach,
            target_count: DEFAULT_TARGET_COUNT,
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            routing_weight: DEFAULT_ROUTING_WEIGHT,
            directions: DirectionSet::all(),
            mode: OptimizationMode::default(),
            max_hole_size: DEFAULT_MAX_HOLE_SIZE,
            start: None,
            bike_type: BikeType::default(),
            roundtrip: true,
        }
    }

    /// The given base region, validated, or the one detected from `visited`.
    pub fn resolve_base(&self) -> Result<BaseRegion, PlannerError> {
        match self.base {
            Some(base) => {
                base.validate()?;
                Ok(base)
            }
            None => find_ubersquadrat(&self.visited).ok_or(PlannerError::NoUbersquadrat),
        }
    }

    /// Optimizer input for an already resolved base region.
    pub fn optimize_request(&self, base: BaseRegion) -> OptimizeRequest {
        OptimizeRequest {
            approach: self.approach,
            base,
            grid: self.grid,
            visited: self.visited.clone(),
            target_count: self.target_count,
            max_distance_km: self.max_distance_km,
            routing_weight: self.routing_weight,
            directions: self.directions,
            mode: self.mode,
            max_hole_size: self.max_hole_size,
            start_point: self.start,
        }
    }
}

/// A planned ride, ready to hand to an external router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlan {
    pub approach: Approach,
    pub base: BaseRegion,
    /// Selected squares in riding order
    pub squares: Vec<SelectedSquare>,
    /// One waypoint per entry of `squares`, same order
    pub waypoints: Vec<Waypoint>,
    pub route: Route,
    pub stop: OptimizationStop,
    /// Routing profile for the chosen bike type
    pub profile: String,
}

/// Select squares, place waypoints on roads and order them into a ride.
pub fn plan_route(
    request: &PlanRequest,
    roads: &[RoadFeature],
    config: &PlannerConfig,
) -> Result<RoutePlan, PlannerError> {
    request.grid.validate()?;
    let base = request.resolve_base()?;
    let start = request.start.unwrap_or_else(|| base.center(&request.grid));

    let outcome = optimize(&request.optimize_request(base), config);
    debug!(
        approach = %outcome.approach,
        selected = outcome.squares.len(),
        stop = ?outcome.stop,
        "optimizer finished"
    );

    let squares = match outcome.approach {
        Approach::Strategic => {
            order_by_route(outcome.squares, roads, request, start, config.max_two_opt_passes)
        }
        // Orienteering already emits squares in riding order
        Approach::Orienteering => outcome.squares,
    };

    let keys: Vec<SquareKey> = squares.iter().map(|square| square.key).collect();
    let waypoints =
        place_waypoints_sequenced(&keys, roads, &request.grid, start, request.roundtrip);

    let mut points = Vec::with_capacity(waypoints.len() + 2);
    points.push(start);
    points.extend(waypoints.iter().map(Waypoint::point));
    if request.roundtrip {
        points.push(start);
    }
    let route = Route {
        distance_km: calculate_route_distance(&points),
        order: (0..waypoints.len()).collect(),
        points,
        roundtrip: request.roundtrip,
    };

    info!(
        approach = %outcome.approach,
        squares = squares.len(),
        roads = roads.len(),
        distance_km = route.distance_km,
        roundtrip = request.roundtrip,
        "route planned"
    );

    Ok(RoutePlan {
        approach: outcome.approach,
        base,
        squares,
        waypoints,
        route,
        stop: outcome.stop,
        profile: request.bike_type.profile().to_string(),
    })
}

/// Order strategic squares by a tour through their provisional waypoints.
fn order_by_route(
    squares: Vec<SelectedSquare>,
    roads: &[RoadFeature],
    request: &PlanRequest,
    start: LatLon,
    max_passes: usize,
) -> Vec<SelectedSquare> {
    let keys: Vec<SquareKey> = squares.iter().map(|square| square.key).collect();
    let provisional: Vec<LatLon> = place_waypoints(&keys, roads, &request.grid)
        .iter()
        .map(Waypoint::point)
        .collect();
    let tour = solve_route(start, &provisional, request.roundtrip, max_passes);

    let mut slots: Vec<Option<SelectedSquare>> = squares.into_iter().map(Some).collect();
    tour.order
        .iter()
        .filter_map(|index| slots.get_mut(*index).and_then(Option::take))
        .collect()
}
