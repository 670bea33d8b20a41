//! Loading planner input documents and road files.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use squadrat_core::{PlanRequest, PlannerConfig, RoadFeature};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Planner input as read from disk: the plan request plus optional tunables.
#[derive(Debug, Clone, Deserialize)]
pub struct InputDocument {
    #[serde(flatten)]
    pub request: PlanRequest,
    #[serde(default)]
    pub config: Option<PlannerConfig>,
}

impl InputDocument {
    /// The document's `config` block, else defaults with `SQUADRAT_*` overrides.
    pub fn planner_config(&self) -> PlannerConfig {
        self.config.clone().unwrap_or_else(PlannerConfig::from_env)
    }
}

pub fn load_input(path: &Path) -> Result<InputDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read input document {}", path.display()))?;
    let doc: InputDocument = serde_json::from_str(&raw)
        .with_context(|| format!("invalid input document {}", path.display()))?;
    debug!(
        path = %path.display(),
        visited = doc.request.visited.len(),
        approach = %doc.request.approach,
        "loaded input document"
    );
    Ok(doc)
}

/// Road file contents: either plain `RoadFeature`s or a GeoJSON FeatureCollection.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoadsFile {
    Features(Vec<RoadFeature>),
    Collection(FeatureCollection),
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<GeoJsonFeature>,
}

#[derive(Debug, Deserialize)]
struct GeoJsonFeature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Unsupported,
}

pub fn load_roads(path: &Path) -> Result<Vec<RoadFeature>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read road file {}", path.display()))?;
    parse_roads(&raw).with_context(|| format!("invalid road file {}", path.display()))
}

/// Parse road JSON. Only line geometries are kept; elevation values are dropped.
pub fn parse_roads(raw: &str) -> Result<Vec<RoadFeature>> {
    let file: RoadsFile = serde_json::from_str(raw)?;
    let roads = match file {
        RoadsFile::Features(roads) => roads,
        RoadsFile::Collection(collection) => {
            let total = collection.features.len();
            let roads: Vec<RoadFeature> = collection
                .features
                .into_iter()
                .flat_map(feature_lines)
                .collect();
            debug!(features = total, lines = roads.len(), "converted GeoJSON roads");
            roads
        }
    };
    if roads.is_empty() {
        warn!("road file holds no line geometry, waypoints fall back to square centers");
    }
    Ok(roads)
}

fn feature_lines(feature: GeoJsonFeature) -> Vec<RoadFeature> {
    let id = feature.id.map(|id| match id {
        Value::String(s) => s,
        other => other.to_string(),
    });
    let lines = match feature.geometry {
        Some(Geometry::LineString { coordinates }) => vec![coordinates],
        Some(Geometry::MultiLineString { coordinates }) => coordinates,
        Some(Geometry::Unsupported) | None => Vec::new(),
    };

    lines
        .into_iter()
        .filter_map(|line| {
            let coordinates: Option<Vec<[f64; 2]>> = line
                .iter()
                .map(|position| match position.as_slice() {
                    [lon, lat, ..] => Some([*lon, *lat]),
                    _ => None,
                })
                .collect();
            match coordinates {
                Some(coordinates) => Some(RoadFeature {
                    id: id.clone(),
                    coordinates,
                }),
                None => {
                    warn!(id = ?id, "skipping line with short position");
                    None
                }
            }
        })
        .collect()
}

/// Fail early on a grid the planner would reject anyway.
pub fn check_document(doc: &InputDocument) -> Result<()> {
    doc.request.grid.validate()?;
    if doc.request.base.is_none() && doc.request.visited.is_empty() {
        bail!("input document needs either `base` or a non-empty `visited` list");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_feature_list_parses() {
        let roads = parse_roads(r#"[{"coordinates": [[7.0, 51.0], [7.01, 51.0]]}]"#).unwrap();
        assert_eq!(roads.len(), 1);
        assert!(roads[0].id.is_none());
    }

    #[test]
    fn geojson_collection_flattens_lines() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": 42, "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[7.0, 51.0, 120.5], [7.01, 51.0, 121.0]]}},
                {"type": "Feature", "id": "way/7",
                 "geometry": {"type": "MultiLineString", "coordinates": [
                    [[7.0, 51.0], [7.0, 51.01]],
                    [[7.02, 51.0], [7.02, 51.01]]
                 ]}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [7.0, 51.0]}},
                {"type": "Feature", "geometry": null}
            ]
        }"#;
        let roads = parse_roads(raw).unwrap();
        assert_eq!(roads.len(), 3);
        assert_eq!(roads[0].id.as_deref(), Some("42"));
        assert_eq!(roads[0].coordinates[1], [7.01, 51.0]);
        assert_eq!(roads[2].id.as_deref(), Some("way/7"));
    }

    #[test]
    fn short_positions_are_skipped() {
        let raw = r#"{"features": [
            {"geometry": {"type": "LineString", "coordinates": [[7.0], [7.01, 51.0]]}}
        ]}"#;
        assert!(parse_roads(raw).unwrap().is_empty());
    }

    #[test]
    fn document_with_config_block() {
        let raw = r#"{
            "grid": {"lat_step": 0.01, "lon_step": 0.015, "origin_lat": 51.0, "origin_lon": 7.0},
            "visited": [[0, 0]],
            "approach": "orienteering",
            "max_distance_km": 20,
            "config": {"gap_km": 4.5}
        }"#;
        let doc: InputDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.request.max_distance_km, 20.0);
        let config = doc.planner_config();
        assert_eq!(config.gap_km, 4.5);
        assert_eq!(config.search_radius, PlannerConfig::default().search_radius);
        assert!(check_document(&doc).is_ok());
    }

    #[test]
    fn document_without_base_or_history_is_rejected() {
        let raw = r#"{
            "grid": {"lat_step": 0.01, "lon_step": 0.015, "origin_lat": 51.0, "origin_lon": 7.0}
        }"#;
        let doc: InputDocument = serde_json::from_str(raw).unwrap();
        assert!(check_document(&doc).is_err());
    }
}
