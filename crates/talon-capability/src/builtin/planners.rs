use crate::capability::{CapabilityDescriptor, PlanningCapability};
use async_trait::async_trait;
use std::f64::consts::TAU;
use talon_core::{
    AreaOfInterest, GeoPoint, PayloadType, Route, TalonError, TalonResult, Waypoint,
};

/// Meters per degree of latitude, good enough for leg-time estimates.
const METERS_PER_DEGREE: f64 = 111_000.0;

/// SAR sweep planner: a serpentine (lawnmower) pattern over the area's
/// bounding box, sized for wide-area radar coverage.
pub struct GridScanPlanner {
    descriptor: CapabilityDescriptor,
    /// Spacing between adjacent sweep tracks, in degrees of latitude.
    track_spacing_deg: f64,
    altitude_m: f64,
    speed_mps: f64,
}

impl GridScanPlanner {
    /// Creates a planner with the standard SAR profile
    /// (5000 m, 150 m/s, 0.02° track spacing).
    pub fn new() -> Self {
        Self::with_profile(0.02, 5000.0, 150.0)
    }

    /// Creates a planner with a custom sweep profile.
    pub fn with_profile(track_spacing_deg: f64, altitude_m: f64, speed_mps: f64) -> Self {
        Self {
            descriptor: CapabilityDescriptor {
                name: "grid_scan_planner".into(),
                description: "serpentine SAR sweep over the area bounding box".into(),
                payload: PayloadType::Sar,
            },
            track_spacing_deg,
            altitude_m,
            speed_mps,
        }
    }
}

impl Default for GridScanPlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanningCapability for GridScanPlanner {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn plan(&self, aoi: &AreaOfInterest) -> TalonResult<Route> {
        let (north, south, east, west) = aoi.area.bounding_box();
        if north <= south || east <= west {
            return Err(TalonError::Capability {
                message: "degenerate area: bounding box has no extent".into(),
                retryable: false,
            });
        }

        let altitude = self.altitude_m;
        let mut waypoints = Vec::new();
        let mut lat = south;
        let mut eastbound = true;
        while lat <= north + 1e-12 {
            let (start, end) = if eastbound { (west, east) } else { (east, west) };
            waypoints.push(Waypoint::new(GeoPoint::new(lat, start), altitude, self.speed_mps));
            waypoints.push(Waypoint::new(GeoPoint::new(lat, end), altitude, self.speed_mps));
            lat += self.track_spacing_deg;
            eastbound = !eastbound;
        }

        let estimated_time_s = route_length_deg(&waypoints) * METERS_PER_DEGREE / self.speed_mps;
        Route::new(PayloadType::Sar, waypoints, estimated_time_s).ok_or_else(|| {
            TalonError::Capability {
                message: "sweep produced no waypoints".into(),
                retryable: false,
            }
        })
    }
}

/// EO observation planner: an orbit around the focus point (a prior SAR
/// detection) or, absent focus, the area centroid.
pub struct OrbitPlanner {
    descriptor: CapabilityDescriptor,
    /// Orbit radius in degrees.
    radius_deg: f64,
    /// Waypoints per orbit.
    segments: usize,
    altitude_m: f64,
    speed_mps: f64,
}

impl OrbitPlanner {
    /// Creates a planner with the standard EO profile
    /// (3000 m, 120 m/s, 0.002° radius, 8 segments).
    pub fn new() -> Self {
        Self {
            descriptor: CapabilityDescriptor {
                name: "orbit_planner".into(),
                description: "circular EO observation orbit around the focus point".into(),
                payload: PayloadType::Eo,
            },
            radius_deg: 0.002,
            segments: 8,
            altitude_m: 3000.0,
            speed_mps: 120.0,
        }
    }
}

impl Default for OrbitPlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanningCapability for OrbitPlanner {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn plan(&self, aoi: &AreaOfInterest) -> TalonResult<Route> {
        let center = aoi.focus.first().copied().unwrap_or_else(|| aoi.area.centroid());

        let mut waypoints = Vec::with_capacity(self.segments + 1);
        for i in 0..=self.segments {
            let angle = TAU * (i as f64) / (self.segments as f64);
            waypoints.push(Waypoint::new(
                GeoPoint::new(
                    center.lat + self.radius_deg * angle.sin(),
                    center.lon + self.radius_deg * angle.cos(),
                ),
                self.altitude_m,
                self.speed_mps,
            ));
        }

        let estimated_time_s = route_length_deg(&waypoints) * METERS_PER_DEGREE / self.speed_mps;
        Route::new(PayloadType::Eo, waypoints, estimated_time_s).ok_or_else(|| {
            TalonError::Capability {
                message: "orbit produced no waypoints".into(),
                retryable: false,
            }
        })
    }
}

/// Total leg length of a waypoint chain, in degrees.
fn route_length_deg(waypoints: &[Waypoint]) -> f64 {
    waypoints
        .windows(2)
        .map(|pair| {
            let a = pair[0].position;
            let b = pair[1].position;
            ((b.lat - a.lat).powi(2) + (b.lon - a.lon).powi(2)).sqrt()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use talon_core::Area;

    fn test_aoi() -> AreaOfInterest {
        AreaOfInterest::whole(Area::from_bounds(35.18, 35.12, 117.55, 117.45))
    }

    #[tokio::test]
    async fn test_grid_scan_covers_bounds() {
        let planner = GridScanPlanner::new();
        let route = planner.plan(&test_aoi()).await.unwrap();

        assert_eq!(route.payload, PayloadType::Sar);
        assert!(route.waypoints.len() >= 4, "sweep should have several legs");
        assert!(route.estimated_time_s > 0.0);

        // Every waypoint stays within the requested bounds.
        for wp in &route.waypoints {
            assert!(wp.position.lat >= 35.12 - 1e-9 && wp.position.lat <= 35.18 + 1e-9);
            assert!(wp.position.lon >= 117.45 - 1e-9 && wp.position.lon <= 117.55 + 1e-9);
            assert_eq!(wp.altitude_m, 5000.0);
        }
    }

    #[tokio::test]
    async fn test_grid_scan_is_deterministic() {
        let planner = GridScanPlanner::new();
        let a = planner.plan(&test_aoi()).await.unwrap();
        let b = planner.plan(&test_aoi()).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_orbit_anchors_on_focus() {
        let planner = OrbitPlanner::new();
        let mut aoi = test_aoi();
        let focus = GeoPoint::new(35.1234, 117.5678);
        aoi.focus.push(focus);

        let route = planner.plan(&aoi).await.unwrap();
        assert_eq!(route.payload, PayloadType::Eo);
        for wp in &route.waypoints {
            let dist = ((wp.position.lat - focus.lat).powi(2)
                + (wp.position.lon - focus.lon).powi(2))
            .sqrt();
            assert!((dist - 0.002).abs() < 1e-9, "waypoint off the orbit circle");
            assert_eq!(wp.altitude_m, 3000.0);
        }
    }

    #[tokio::test]
    async fn test_orbit_falls_back_to_centroid() {
        let planner = OrbitPlanner::new();
        let route = planner.plan(&test_aoi()).await.unwrap();
        let centroid = test_aoi().area.centroid();
        let first = route.waypoints[0].position;
        assert!((first.lat - centroid.lat).abs() < 0.01);
        assert!((first.lon - centroid.lon).abs() < 0.01);
    }
}
