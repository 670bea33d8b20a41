//! Spatial math for distances and the local planar road frame.

use crate::models::LatLon;
use geo::{coord, Coord};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate distance between two points in meters using Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in meters
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Great-circle distance between two points in kilometers.
pub fn distance_km(a: LatLon, b: LatLon) -> f64 {
    haversine_distance(a.lat, a.lon, b.lat, b.lon) / 1000.0
}

// ==== Local planar projection ====
// Road geometry inside one square spans a few hundred meters, so a
// latitude-scaled equirectangular frame is accurate enough.

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// East/north meter offsets around a fixed reference point.
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    origin: LatLon,
    meters_lat: f64,
    meters_lon: f64,
}

impl LocalFrame {
    pub fn new(origin: LatLon) -> Self {
        Self {
            origin,
            meters_lat: meters_per_deg_lat(origin.lat).max(1e-9),
            meters_lon: meters_per_deg_lon(origin.lat).max(1e-9),
        }
    }

    /// Project a lon/lat coordinate to east/north meters.
    pub fn project(&self, lon_lat: Coord<f64>) -> Coord<f64> {
        coord! {
            x: (lon_lat.x - self.origin.lon) * self.meters_lon,
            y: (lon_lat.y - self.origin.lat) * self.meters_lat,
        }
    }

    pub fn unproject(&self, xy: Coord<f64>) -> LatLon {
        LatLon {
            lat: self.origin.lat + xy.y / self.meters_lat,
            lon: self.origin.lon + xy.x / self.meters_lon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_distance(52.5163, 13.3777, 52.5163, 13.3777);
        assert!(dist < 0.001);
    }

    #[test]
    fn local_frame_round_trips_nearby_points() {
        let frame = LocalFrame::new(LatLon::new(47.37, 8.54));
        let back = frame.unproject(frame.project(coord! { x: 8.545, y: 47.372 }));
        assert!((back.lat - 47.372).abs() < 1e-12);
        assert!((back.lon - 8.545).abs() < 1e-12);
    }

    #[test]
    fn local_frame_origin_projects_to_zero() {
        let frame = LocalFrame::new(LatLon::new(50.005, 8.005));
        let origin = frame.project(coord! { x: 8.005, y: 50.005 });
        assert_eq!(origin, coord! { x: 0.0, y: 0.0 });
        let north = frame.project(coord! { x: 8.005, y: 50.006 });
        assert!((north.y - 111.2).abs() < 0.5);
    }
}
