//! Squadrat expansion planning.
//!
//! Picks unvisited grid squares around an Übersquadrat, places a waypoint on
//! the road network inside each of them and orders the waypoints into a ride.

pub mod clip;
pub mod config;
pub mod error;
pub mod grid;
pub mod models;
pub mod optimizer;
pub mod orienteering;
pub mod planner;
pub mod region;
pub mod route;
pub mod scoring;
pub mod spatial;
pub mod strategic;
pub mod ubersquadrat;
pub mod waypoint;

pub use config::PlannerConfig;
pub use error::{GeometryError, PlannerError};
pub use grid::{is_on_border, layer_distance, rect_from_ij, square_at, square_center};
pub use models::{
    Approach, BaseRegion, BikeType, Direction, DirectionSet, GridParams, LatLon,
    OptimizationMode, RoadFeature, SelectedSquare, SquareBounds, SquareKey, VisitedSet, Waypoint,
    WaypointCandidate, WaypointKind,
};
pub use optimizer::{optimize, OptimizationOutcome, OptimizationStop, OptimizeRequest};
pub use orienteering::{optimize_orienteering, OrienteeringParams, OrienteeringResult};
pub use planner::{plan_route, PlanRequest, RoutePlan};
pub use region::{analyze_edges, detect_holes, EdgeAnalysis, Hole, HoleAnalysis};
pub use route::{
    calculate_route_distance, nearest_neighbor, solve_route, stitch_legs, two_opt_optimize, Route,
};
pub use spatial::haversine_distance;
pub use strategic::{optimize_strategic, StrategicParams, StrategicResult};
pub use ubersquadrat::find_ubersquadrat;
pub use waypoint::{place_waypoints, place_waypoints_sequenced};
