use serde::{Deserialize, Serialize};
use std::time::Duration;
use talon_core::{GeoPoint, VehiclePhase};

/// Simulation policy for one vehicle: phase durations, fault injection, and
/// determinism controls.
///
/// All values are configuration with documented defaults; nothing here is
/// hard-coded into the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimPolicy {
    /// Seconds spent in `Takeoff` before reaching `EnRoute`. Default 1.0.
    #[serde(default = "default_takeoff_s")]
    pub takeoff_s: f64,
    /// Seconds spent in `EnRoute` before reaching `OnStation`. Default 2.0.
    #[serde(default = "default_transit_s")]
    pub transit_s: f64,
    /// Seconds spent collecting `OnStation` before `Returning`. Default 3.0.
    #[serde(default = "default_collection_s")]
    pub collection_s: f64,
    /// Seconds spent `Returning` before `Landed`. Default 2.0.
    #[serde(default = "default_return_s")]
    pub return_s: f64,
    /// Probability in `[0, 1]` that any timed transition drops to `Fault`
    /// instead. Default 0.0.
    #[serde(default)]
    pub fault_probability: f64,
    /// RNG seed for reproducible fault rolls. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Force a fault on entry to this phase. Test hook; overrides the
    /// probability roll. Default none.
    #[serde(default)]
    pub fail_at: Option<VehiclePhase>,
    /// Home position the vehicle launches from and returns to.
    #[serde(default = "default_home")]
    pub home: GeoPoint,
}

fn default_takeoff_s() -> f64 {
    1.0
}
fn default_transit_s() -> f64 {
    2.0
}
fn default_collection_s() -> f64 {
    3.0
}
fn default_return_s() -> f64 {
    2.0
}
fn default_home() -> GeoPoint {
    GeoPoint::new(35.0, 117.3)
}

impl Default for SimPolicy {
    fn default() -> Self {
        Self {
            takeoff_s: default_takeoff_s(),
            transit_s: default_transit_s(),
            collection_s: default_collection_s(),
            return_s: default_return_s(),
            fault_probability: 0.0,
            seed: None,
            fail_at: None,
            home: default_home(),
        }
    }
}

impl SimPolicy {
    /// A deterministic policy with fast timings, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::fast()
        }
    }

    /// Millisecond-scale timings so full flights finish quickly.
    pub fn fast() -> Self {
        Self {
            takeoff_s: 0.01,
            transit_s: 0.02,
            collection_s: 0.03,
            return_s: 0.02,
            ..Self::default()
        }
    }

    /// Duration of the `Takeoff` phase.
    pub fn takeoff(&self) -> Duration {
        Duration::from_secs_f64(self.takeoff_s)
    }

    /// Duration of the `EnRoute` phase.
    pub fn transit(&self) -> Duration {
        Duration::from_secs_f64(self.transit_s)
    }

    /// Duration of the `OnStation` collection window.
    pub fn collection(&self) -> Duration {
        Duration::from_secs_f64(self.collection_s)
    }

    /// Duration of the `Returning` phase.
    pub fn returning(&self) -> Duration {
        Duration::from_secs_f64(self.return_s)
    }
}
