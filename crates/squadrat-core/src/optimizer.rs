//! Single entry point over the strategic and orienteering optimizers.

use crate::config::PlannerConfig;
use crate::models::{
    Approach, BaseRegion, DirectionSet, GridParams, LatLon, OptimizationMode, SelectedSquare,
    VisitedSet,
};
use crate::orienteering::{optimize_orienteering, OrienteeringParams, OrienteeringStop};
use crate::strategic::{optimize_strategic, StrategicParams, StrategicStop};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TARGET_COUNT: usize = 10;
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;
pub const DEFAULT_ROUTING_WEIGHT: f64 = 1.0;
pub const DEFAULT_MAX_HOLE_SIZE: usize = 10;

/// Snapshot of everything either optimizer may need.
///
/// `target_count` only applies to the strategic approach; `max_distance_km`,
/// `routing_weight` and `start_point` only to orienteering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub approach: Approach,
    pub base: BaseRegion,
    pub grid: GridParams,
    #[serde(default)]
    pub visited: VisitedSet,
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
    pub start_point: Option<LatLon>,
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

impl OptimizeRequest {
    /// Request with documented defaults for everything but the region snapshot.
    pub fn new(approach: Approach, base: BaseRegion, grid: GridParams, visited: VisitedSet) -> Self {
        Self {
            approach,
            base,
            grid,
            visited,
            target_count: DEFAULT_TARGET_COUNT,
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            routing_weight: DEFAULT_ROUTING_WEIGHT,
            directions: DirectionSet::all(),
            mode: OptimizationMode::default(),
            max_hole_size: DEFAULT_MAX_HOLE_SIZE,
            start_point: None,
        }
    }

    pub fn strategic_params(&self) -> StrategicParams {
        StrategicParams {
            base: self.base,
            target_count: self.target_count,
            directions: self.directions,
            visited: self.visited.clone(),
            grid: self.grid,
            mode: self.mode,
            max_hole_size: self.max_hole_size,
        }
    }

    pub fn orienteering_params(&self) -> OrienteeringParams {
        OrienteeringParams {
            base: self.base,
            max_distance_km: self.max_distance_km,
            routing_weight: self.routing_weight,
            directions: self.directions,
            visited: self.visited.clone(),
            grid: self.grid,
            mode: self.mode,
            max_hole_size: self.max_hole_size,
            start_point: self.start_point,
        }
    }
}

/// Why the chosen optimizer stopped adding squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "approach", content = "reason", rename_all = "lowercase")]
pub enum OptimizationStop {
    Strategic(StrategicStop),
    Orienteering(OrienteeringStop),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    pub approach: Approach,
    pub squares: Vec<SelectedSquare>,
    pub stop: OptimizationStop,
    /// Estimated riding distance, orienteering only
    pub distance_km: Option<f64>,
}

pub fn optimize(request: &OptimizeRequest, config: &PlannerConfig) -> OptimizationOutcome {
    match request.approach {
        Approach::Strategic => {
            let result = optimize_strategic(&request.strategic_params(), config);
            OptimizationOutcome {
                approach: Approach::Strategic,
                squares: result.squares,
                stop: OptimizationStop::Strategic(result.stop),
                distance_km: None,
            }
        }
        Approach::Orienteering => {
            let result = optimize_orienteering(&request.orienteering_params(), config);
            OptimizationOutcome {
                approach: Approach::Orienteering,
                squares: result.squares,
                stop: OptimizationStop::Orienteering(result.stop),
                distance_km: Some(result.total_distance_km),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(approach: Approach) -> OptimizeRequest {
        OptimizeRequest::new(
            approach,
            BaseRegion::new(0, 3, 0, 3).unwrap(),
            GridParams::new(0.01, 0.015, 51.0, 7.0),
            VisitedSet::new(),
        )
    }

    #[test]
    fn strategic_uses_target_count() {
        let mut req = request(Approach::Strategic);
        req.target_count = 4;
        let outcome = optimize(&req, &PlannerConfig::default());
        assert_eq!(outcome.approach, Approach::Strategic);
        assert_eq!(outcome.squares.len(), 4);
        assert_eq!(
            outcome.stop,
            OptimizationStop::Strategic(StrategicStop::TargetReached)
        );
        assert!(outcome.distance_km.is_none());
    }

    #[test]
    fn orienteering_ignores_target_count() {
        let mut req = request(Approach::Orienteering);
        req.target_count = 1;
        req.max_distance_km = 15.0;
        let outcome = optimize(&req, &PlannerConfig::default());
        assert!(outcome.squares.len() > 1);
        let distance = outcome.distance_km.expect("orienteering reports distance");
        assert!(distance <= 15.0);
    }

    #[test]
    fn minimal_json_request_uses_defaults() {
        let json = r#"{
            "approach": "orienteering",
            "base": {"min_i": 0, "max_i": 3, "min_j": 0, "max_j": 3},
            "grid": {"lat_step": 0.01, "lon_step": 0.015, "origin_lat": 51.0, "origin_lon": 7.0},
            "visited": [[4, 0], [4, 1]]
        }"#;
        let req: OptimizeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.approach, Approach::Orienteering);
        assert_eq!(req.visited.len(), 2);
        assert_eq!(req.target_count, DEFAULT_TARGET_COUNT);
        assert_eq!(req.max_distance_km, DEFAULT_MAX_DISTANCE_KM);
        assert!(req.directions.is_all());
        assert_eq!(req.mode, OptimizationMode::Balanced);
    }
}
