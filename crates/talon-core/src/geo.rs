use serde::{Deserialize, Serialize};

/// A WGS-84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees, north positive.
    pub lat: f64,
    /// Longitude in decimal degrees, east positive.
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A target area: a closed polygon over the ground.
///
/// Construction is either from an explicit vertex list or from
/// north/south/east/west bounds (the common case for area reconnaissance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// Polygon vertices in order. The polygon is implicitly closed.
    pub vertices: Vec<GeoPoint>,
}

impl Area {
    /// Creates an area from an ordered vertex list.
    ///
    /// Returns `None` for degenerate polygons (fewer than three vertices).
    pub fn new(vertices: Vec<GeoPoint>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        Some(Self { vertices })
    }

    /// Creates a rectangular area from compass bounds.
    pub fn from_bounds(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            vertices: vec![
                GeoPoint::new(south, west),
                GeoPoint::new(south, east),
                GeoPoint::new(north, east),
                GeoPoint::new(north, west),
            ],
        }
    }

    /// The axis-aligned bounding box as (north, south, east, west).
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        let mut north = f64::MIN;
        let mut south = f64::MAX;
        let mut east = f64::MIN;
        let mut west = f64::MAX;
        for v in &self.vertices {
            north = north.max(v.lat);
            south = south.min(v.lat);
            east = east.max(v.lon);
            west = west.min(v.lon);
        }
        (north, south, east, west)
    }

    /// Arithmetic mean of the vertices. Adequate as an orbit anchor for the
    /// small convex areas this system deals in.
    pub fn centroid(&self) -> GeoPoint {
        let n = self.vertices.len() as f64;
        let (lat, lon) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(la, lo), v| (la + v.lat, lo + v.lon));
        GeoPoint::new(lat / n, lon / n)
    }
}

/// A single route waypoint: position plus commanded altitude and speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Ground position of the waypoint.
    pub position: GeoPoint,
    /// Commanded altitude in meters above mean sea level.
    pub altitude_m: f64,
    /// Commanded ground speed in meters per second.
    pub speed_mps: f64,
}

impl Waypoint {
    /// Creates a waypoint at the given position, altitude, and speed.
    pub fn new(position: GeoPoint, altitude_m: f64, speed_mps: f64) -> Self {
        Self {
            position,
            altitude_m,
            speed_mps,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_area_rejects_degenerate() {
        assert!(Area::new(vec![]).is_none());
        assert!(Area::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)]).is_none());
    }

    #[test]
    fn test_bounds_round_trip() {
        let area = Area::from_bounds(35.2, 35.0, 117.7, 117.4);
        let (n, s, e, w) = area.bounding_box();
        assert_eq!((n, s, e, w), (35.2, 35.0, 117.7, 117.4));
    }

    #[test]
    fn test_centroid_of_rectangle() {
        let area = Area::from_bounds(2.0, 0.0, 4.0, 0.0);
        let c = area.centroid();
        assert!((c.lat - 1.0).abs() < 1e-9);
        assert!((c.lon - 2.0).abs() < 1e-9);
    }
}
