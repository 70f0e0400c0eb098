use crate::geo::GeoPoint;
use crate::mission::{PayloadType, Route, SensorProduct};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flight phase of a simulated vehicle.
///
/// The nominal cycle is `Ground → Takeoff → EnRoute → OnStation → Returning
/// → Landed → Ground`. Any phase may drop to `Fault`, from which only an
/// abort/reset is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehiclePhase {
    /// Parked and ready for launch.
    Ground,
    /// Climbing out after a launch command.
    Takeoff,
    /// Transiting to the route's final waypoint.
    EnRoute,
    /// At the collection area, sensors active.
    OnStation,
    /// Flying home.
    Returning,
    /// Touched down, about to be ready again.
    Landed,
    /// Simulated failure. Requires an explicit abort/reset.
    Fault,
}

impl VehiclePhase {
    /// Whether the vehicle is in the air in this phase.
    pub fn is_airborne(&self) -> bool {
        matches!(
            self,
            VehiclePhase::Takeoff
                | VehiclePhase::EnRoute
                | VehiclePhase::OnStation
                | VehiclePhase::Returning
        )
    }
}

impl std::fmt::Display for VehiclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VehiclePhase::Ground => "ground",
            VehiclePhase::Takeoff => "takeoff",
            VehiclePhase::EnRoute => "en_route",
            VehiclePhase::OnStation => "on_station",
            VehiclePhase::Returning => "returning",
            VehiclePhase::Landed => "landed",
            VehiclePhase::Fault => "fault",
        };
        write!(f, "{name}")
    }
}

/// A command accepted by the vehicle simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum VehicleAction {
    /// Launch and fly the given route. Legal only from `Ground`.
    Launch {
        /// The route to fly.
        route: Route,
        /// The task whose dispatch this is; collected products are tagged
        /// with it so processing can be tied back to its task.
        task_id: Uuid,
    },
    /// Abort whatever is happening and reset to `Ground`. Always legal, and
    /// the only way out of `Fault`.
    Abort,
    /// Break off and return home. Legal from airborne phases.
    Land,
}

impl VehicleAction {
    /// Short name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            VehicleAction::Launch { .. } => "launch",
            VehicleAction::Abort => "abort",
            VehicleAction::Land => "land",
        }
    }
}

/// Point-in-time flight data attached to each state notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Current ground position.
    pub position: GeoPoint,
    /// Altitude in meters above mean sea level.
    pub altitude_m: f64,
    /// Ground speed in meters per second.
    pub speed_mps: f64,
}

impl Telemetry {
    /// Telemetry for a vehicle parked at a position.
    pub fn grounded(position: GeoPoint) -> Self {
        Self {
            position,
            altitude_m: 0.0,
            speed_mps: 0.0,
        }
    }
}

/// A read-only snapshot of one vehicle's state, as delivered to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleState {
    /// The vehicle this snapshot describes.
    pub vehicle_id: Uuid,
    /// Phase after the transition that produced this snapshot.
    pub phase: VehiclePhase,
    /// Per-vehicle event sequence number; strictly increasing, gap-free.
    pub seq: u64,
    /// Payload of the active route, if one is loaded.
    pub route_payload: Option<PayloadType>,
    /// Telemetry at the moment of the transition.
    pub telemetry: Telemetry,
    /// UTC timestamp of the transition.
    pub at: DateTime<Utc>,
}

/// What a single vehicle notification carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VehicleEventKind {
    /// A phase transition.
    Transition(VehicleState),
    /// A sensor product collected on station.
    Product(SensorProduct),
}

/// A sequenced notification emitted by the vehicle simulator.
///
/// `seq` is shared across transitions and products of one vehicle; the
/// notification bridge deduplicates on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleEvent {
    /// Per-vehicle sequence number of this event.
    pub seq: u64,
    /// The notification payload.
    pub kind: VehicleEventKind,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_airborne_phases() {
        assert!(VehiclePhase::EnRoute.is_airborne());
        assert!(VehiclePhase::OnStation.is_airborne());
        assert!(!VehiclePhase::Ground.is_airborne());
        assert!(!VehiclePhase::Fault.is_airborne());
        assert!(!VehiclePhase::Landed.is_airborne());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(VehiclePhase::OnStation.to_string(), "on_station");
        assert_eq!(VehiclePhase::Ground.to_string(), "ground");
    }

    #[test]
    fn test_action_names() {
        assert_eq!(VehicleAction::Abort.name(), "abort");
        assert_eq!(VehicleAction::Land.name(), "land");
    }
}
