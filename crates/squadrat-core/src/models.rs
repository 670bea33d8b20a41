//! Core data models for squadrat planning.

use crate::error::{GeometryError, PlannerError};
use geo::{coord, Coord, LineString, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Grid definition: square (i, j) spans `origin + index * step` in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    pub lat_step: f64,
    pub lon_step: f64,
    pub origin_lat: f64,
    pub origin_lon: f64,
}

impl GridParams {
    pub fn new(lat_step: f64, lon_step: f64, origin_lat: f64, origin_lon: f64) -> Self {
        Self {
            lat_step,
            lon_step,
            origin_lat,
            origin_lon,
        }
    }

    /// Reject steps that would produce degenerate or inverted squares.
    pub fn validate(&self) -> Result<(), PlannerError> {
        let values = [self.lat_step, self.lon_step, self.origin_lat, self.origin_lon];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(PlannerError::InvalidGrid(
                "grid parameters must be finite".to_string(),
            ));
        }
        if self.lat_step <= 0.0 || self.lon_step <= 0.0 {
            return Err(PlannerError::InvalidGrid(format!(
                "steps must be positive (lat_step={}, lon_step={})",
                self.lat_step, self.lon_step
            )));
        }
        Ok(())
    }
}

/// Address of one grid square. `i` indexes latitude rows, `j` longitude columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct SquareKey {
    pub i: i32,
    pub j: i32,
}

impl SquareKey {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }
}

impl From<(i32, i32)> for SquareKey {
    fn from((i, j): (i32, i32)) -> Self {
        Self { i, j }
    }
}

impl From<SquareKey> for (i32, i32) {
    fn from(key: SquareKey) -> Self {
        (key.i, key.j)
    }
}

impl fmt::Display for SquareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.i, self.j)
    }
}

/// Squares the user has already covered.
pub type VisitedSet = HashSet<SquareKey>;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Lat/lon rectangle of one square, serialized as `[[south, west], [north, east]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct SquareBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl SquareBounds {
    pub fn center(&self) -> LatLon {
        LatLon {
            lat: (self.south + self.north) / 2.0,
            lon: (self.west + self.east) / 2.0,
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: LatLon) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lon >= self.west
            && point.lon <= self.east
    }

    /// Same rectangle in lon/lat (`x`/`y`) coordinates.
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.west, y: self.south },
            coord! { x: self.east, y: self.north },
        )
    }
}

impl From<[[f64; 2]; 2]> for SquareBounds {
    fn from(value: [[f64; 2]; 2]) -> Self {
        Self {
            south: value[0][0],
            west: value[0][1],
            north: value[1][0],
            east: value[1][1],
        }
    }
}

impl From<SquareBounds> for [[f64; 2]; 2] {
    fn from(bounds: SquareBounds) -> Self {
        [[bounds.south, bounds.west], [bounds.north, bounds.east]]
    }
}

/// The Übersquadrat: an inclusive rectangle in grid-index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRegion {
    pub min_i: i32,
    pub max_i: i32,
    pub min_j: i32,
    pub max_j: i32,
}

impl BaseRegion {
    pub fn new(min_i: i32, max_i: i32, min_j: i32, max_j: i32) -> Result<Self, PlannerError> {
        let base = Self {
            min_i,
            max_i,
            min_j,
            max_j,
        };
        base.validate()?;
        Ok(base)
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.min_i > self.max_i || self.min_j > self.max_j {
            return Err(PlannerError::InvalidBaseRegion {
                min_i: self.min_i,
                max_i: self.max_i,
                min_j: self.min_j,
                max_j: self.max_j,
            });
        }
        Ok(())
    }

    pub fn contains(&self, key: SquareKey) -> bool {
        key.i >= self.min_i && key.i <= self.max_i && key.j >= self.min_j && key.j <= self.max_j
    }

    /// Number of rows covered.
    pub fn height(&self) -> i32 {
        self.max_i.saturating_sub(self.min_i).saturating_add(1)
    }

    /// Number of columns covered.
    pub fn width(&self) -> i32 {
        self.max_j.saturating_sub(self.min_j).saturating_add(1)
    }

    /// Rectangle spanning every square of the region.
    pub fn bounds(&self, grid: &GridParams) -> SquareBounds {
        SquareBounds {
            south: grid.origin_lat + self.min_i as f64 * grid.lat_step,
            west: grid.origin_lon + self.min_j as f64 * grid.lon_step,
            north: grid.origin_lat + (self.max_i as f64 + 1.0) * grid.lat_step,
            east: grid.origin_lon + (self.max_j as f64 + 1.0) * grid.lon_step,
        }
    }

    /// Geometric center of the region.
    pub fn center(&self, grid: &GridParams) -> LatLon {
        self.bounds(grid).center()
    }

    /// Same region grown by `radius` squares on every side, clamped to the key range.
    pub fn expanded(&self, radius: i32) -> Self {
        Self {
            min_i: self.min_i.saturating_sub(radius),
            max_i: self.max_i.saturating_add(radius),
            min_j: self.min_j.saturating_sub(radius),
            max_j: self.max_j.saturating_add(radius),
        }
    }
}

/// Side of the Übersquadrat. North is increasing `i`, east is increasing `j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "N", alias = "north")]
    North,
    #[serde(rename = "S", alias = "south")]
    South,
    #[serde(rename = "E", alias = "east")]
    East,
    #[serde(rename = "W", alias = "west")]
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    fn bit(self) -> u8 {
        match self {
            Direction::North => 1,
            Direction::South => 2,
            Direction::East => 4,
            Direction::West => 8,
        }
    }

    /// Whether `key` lies beyond this side of `base`.
    pub fn extends(self, key: SquareKey, base: &BaseRegion) -> bool {
        match self {
            Direction::North => key.i > base.max_i,
            Direction::South => key.i < base.min_i,
            Direction::East => key.j > base.max_j,
            Direction::West => key.j < base.min_j,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::North => "N",
            Direction::South => "S",
            Direction::East => "E",
            Direction::West => "W",
        };
        f.write_str(label)
    }
}

/// Small set of directions, serialized as a list such as `["N", "E"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Direction>", into = "Vec<Direction>")]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(0b1111)
    }

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_all(&self) -> bool {
        self.0 == 0b1111
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }

    /// Sides of `base` that `key` extends beyond.
    pub fn of_square(key: SquareKey, base: &BaseRegion) -> Self {
        Direction::ALL
            .into_iter()
            .filter(|direction| direction.extends(key, base))
            .collect()
    }

    /// Directional veto check; an empty or full selection filters nothing.
    pub fn permits(&self, key: SquareKey, base: &BaseRegion) -> bool {
        if self.is_empty() || self.is_all() {
            return true;
        }
        self.iter().any(|direction| direction.extends(key, base))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<T: IntoIterator<Item = Direction>>(iter: T) -> Self {
        let mut set = Self::empty();
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}

impl From<Vec<Direction>> for DirectionSet {
    fn from(value: Vec<Direction>) -> Self {
        value.into_iter().collect()
    }
}

impl From<DirectionSet> for Vec<Direction> {
    fn from(set: DirectionSet) -> Self {
        set.iter().collect()
    }
}

/// Weighting between edge completion and hole filling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationMode {
    #[default]
    Balanced,
    /// Favor completing the rows/columns around the Übersquadrat
    Edge,
    /// Favor filling enclosed holes
    Holes,
}

impl OptimizationMode {
    pub fn edge_multiplier(self) -> f64 {
        match self {
            OptimizationMode::Balanced => 1.0,
            OptimizationMode::Edge => 3.0,
            OptimizationMode::Holes => 0.3,
        }
    }

    pub fn hole_multiplier(self) -> f64 {
        match self {
            OptimizationMode::Balanced => 1.0,
            OptimizationMode::Edge => 0.3,
            OptimizationMode::Holes => 2.0,
        }
    }
}

/// Which optimizer builds the square selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approach {
    /// Batch scoring of a fixed number of squares
    #[default]
    Strategic,
    /// Incremental route under a distance budget
    Orienteering,
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Approach::Strategic => f.write_str("strategic"),
            Approach::Orienteering => f.write_str("orienteering"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BikeType {
    #[default]
    Trekking,
    Road,
    Mountain,
    Gravel,
}

impl BikeType {
    /// Routing profile name understood by the external directions service.
    pub fn profile(self) -> &'static str {
        match self {
            BikeType::Trekking => "trekking",
            BikeType::Road => "fastbike",
            BikeType::Mountain => "mtb",
            BikeType::Gravel => "gravel",
        }
    }
}

/// A square chosen by one of the optimizers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedSquare {
    pub key: SquareKey,
    pub bounds: SquareBounds,
    /// Layer distance from the Übersquadrat border
    pub layer: u32,
    pub score: f64,
}

/// Road line geometry with GeoJSON `[lon, lat]` vertex order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadFeature {
    #[serde(default)]
    pub id: Option<String>,
    pub coordinates: Vec<[f64; 2]>,
}

impl RoadFeature {
    pub fn new(coordinates: Vec<[f64; 2]>) -> Self {
        Self {
            id: None,
            coordinates,
        }
    }

    /// Convert to a lon/lat line string, rejecting geometry no clipping can use.
    pub fn to_line_string(&self) -> Result<LineString<f64>, GeometryError> {
        if self.coordinates.len() < 2 {
            return Err(GeometryError::TooFewVertices(self.coordinates.len()));
        }
        let mut coords: Vec<Coord<f64>> = Vec::with_capacity(self.coordinates.len());
        for (index, [lon, lat]) in self.coordinates.iter().copied().enumerate() {
            if !lon.is_finite() || !lat.is_finite() {
                return Err(GeometryError::NonFiniteCoordinate { index });
            }
            coords.push(coord! { x: lon, y: lat });
        }
        let first = coords[0];
        if coords.iter().all(|c| *c == first) {
            return Err(GeometryError::ZeroLength);
        }
        Ok(LineString::new(coords))
    }
}

/// How a waypoint was derived from the road network inside its square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointKind {
    /// Crossing of two distinct roads
    Intersection,
    /// Halfway along a clipped road piece
    Midpoint,
    /// Point of a road closest to the square center
    Nearest,
    /// Roads touch the square boundary without running through it
    CenterFallback,
    /// No road crosses the square
    NoRoad,
}

/// A ranked waypoint option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointCandidate {
    pub lat: f64,
    pub lon: f64,
    pub kind: WaypointKind,
    pub priority: f64,
    pub connecting: bool,
}

impl WaypointCandidate {
    pub fn point(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

/// Where the route passes through a selected square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub square: SquareKey,
    pub kind: WaypointKind,
    pub priority: f64,
    /// Sits on a road that continues into the next square
    pub connecting: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<WaypointCandidate>,
}

impl Waypoint {
    pub fn point(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_key_serializes_as_pair() {
        let key = SquareKey::new(-3, 7);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "[-3,7]");
        let back: SquareKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn negative_keys_do_not_collide() {
        let mut visited = VisitedSet::new();
        visited.insert(SquareKey::new(-1, 12));
        visited.insert(SquareKey::new(-11, 2));
        assert_eq!(visited.len(), 2);
    }

    #[test]
    fn base_region_rejects_inverted_bounds() {
        assert!(BaseRegion::new(0, 3, 0, 3).is_ok());
        assert!(matches!(
            BaseRegion::new(4, 3, 0, 3),
            Err(PlannerError::InvalidBaseRegion { .. })
        ));
    }

    #[test]
    fn grid_validation_rejects_zero_step() {
        assert!(GridParams::new(0.01, 0.02, 50.0, 8.0).validate().is_ok());
        assert!(GridParams::new(0.0, 0.02, 50.0, 8.0).validate().is_err());
        assert!(GridParams::new(0.01, f64::NAN, 50.0, 8.0).validate().is_err());
    }

    #[test]
    fn direction_set_parses_short_and_long_names() {
        let set: DirectionSet = serde_json::from_str(r#"["N", "west"]"#).unwrap();
        assert!(set.contains(Direction::North));
        assert!(set.contains(Direction::West));
        assert!(!set.contains(Direction::East));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn direction_filter_treats_empty_and_full_as_unfiltered() {
        let base = BaseRegion::new(0, 3, 0, 3).unwrap();
        let south_square = SquareKey::new(-1, 1);
        assert!(DirectionSet::all().permits(south_square, &base));
        assert!(DirectionSet::empty().permits(south_square, &base));

        let north_only: DirectionSet = [Direction::North].into_iter().collect();
        assert!(!north_only.permits(south_square, &base));
        assert!(north_only.permits(SquareKey::new(4, 1), &base));
    }

    #[test]
    fn road_feature_reads_lon_first() {
        let road = RoadFeature::new(vec![[8.5, 47.3], [8.6, 47.4]]);
        let line = road.to_line_string().unwrap();
        assert_eq!(line.0[0], coord! { x: 8.5, y: 47.3 });
    }

    #[test]
    fn road_feature_rejects_degenerate_geometry() {
        assert_eq!(
            RoadFeature::new(vec![[8.5, 47.3]]).to_line_string(),
            Err(GeometryError::TooFewVertices(1))
        );
        assert_eq!(
            RoadFeature::new(vec![[8.5, 47.3], [8.5, 47.3]]).to_line_string(),
            Err(GeometryError::ZeroLength)
        );
        assert_eq!(
            RoadFeature::new(vec![[8.5, 47.3], [f64::INFINITY, 47.3]]).to_line_string(),
            Err(GeometryError::NonFiniteCoordinate { index: 1 })
        );
    }

    #[test]
    fn bounds_serialize_south_west_first() {
        let bounds = SquareBounds {
            south: 1.0,
            west: 2.0,
            north: 3.0,
            east: 4.0,
        };
        let json = serde_json::to_string(&bounds).unwrap();
        assert_eq!(json, "[[1.0,2.0],[3.0,4.0]]");
    }

    #[test]
    fn extreme_regions_clamp_instead_of_wrapping() {
        let base = BaseRegion::new(i32::MIN, i32::MIN + 1, i32::MAX - 1, i32::MAX).unwrap();
        let grown = base.expanded(5);
        assert_eq!(grown.min_i, i32::MIN);
        assert_eq!(grown.max_i, i32::MIN + 6);
        assert_eq!(grown.min_j, i32::MAX - 6);
        assert_eq!(grown.max_j, i32::MAX);

        let everything = BaseRegion::new(i32::MIN, i32::MAX, 0, 0).unwrap();
        assert_eq!(everything.height(), i32::MAX);
        assert_eq!(everything.width(), 1);
    }

    #[test]
    fn bounds_convert_to_lon_lat_rect() {
        let rect = SquareBounds {
            south: 50.0,
            west: 8.0,
            north: 50.01,
            east: 8.01,
        }
        .to_rect();
        assert_eq!(rect.min(), coord! { x: 8.0, y: 50.0 });
        assert_eq!(rect.max(), coord! { x: 8.01, y: 50.01 });
    }
}
