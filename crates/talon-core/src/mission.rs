use crate::geo::{Area, GeoPoint, Waypoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The sensor payload carried for one task.
///
/// Policy note: within a mission, SAR (wide-area detection) precedes EO
/// (visual confirmation of what SAR detected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadType {
    /// Synthetic-aperture radar: wide-area detection in adverse visibility.
    Sar,
    /// Electro-optical: visual confirmation of detected targets.
    Eo,
}

impl std::fmt::Display for PayloadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadType::Sar => write!(f, "sar"),
            PayloadType::Eo => write!(f, "eo"),
        }
    }
}

/// A planned flight route for one payload over one area.
///
/// Immutable once produced by a planning capability; the simulator consumes
/// it as a command and the orchestrator never edits it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Payload the route was planned for.
    pub payload: PayloadType,
    /// Ordered waypoints from first to last.
    pub waypoints: Vec<Waypoint>,
    /// Planner's estimate of total route time in seconds.
    pub estimated_time_s: f64,
}

impl Route {
    /// Creates a route. Returns `None` when the waypoint list is empty.
    pub fn new(payload: PayloadType, waypoints: Vec<Waypoint>, estimated_time_s: f64) -> Option<Self> {
        if waypoints.is_empty() {
            return None;
        }
        Some(Self {
            payload,
            waypoints,
            estimated_time_s,
        })
    }

    /// The final waypoint — reaching it puts the vehicle on station.
    pub fn final_waypoint(&self) -> &Waypoint {
        // Invariant: constructor rejects empty waypoint lists.
        &self.waypoints[self.waypoints.len() - 1]
    }
}

/// Opaque sensor output produced while on station.
///
/// Immutable once produced. `task_id` ties the product to the task whose
/// route was being flown when it was collected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorProduct {
    /// Unique identifier of this product.
    pub id: Uuid,
    /// Payload that produced the data.
    pub payload: PayloadType,
    /// The task whose dispatch produced this product.
    pub task_id: Uuid,
    /// Raw payload data. Opaque to the orchestrator; only processing
    /// capabilities interpret it.
    pub data: serde_json::Value,
    /// UTC collection timestamp.
    pub collected_at: DateTime<Utc>,
}

impl SensorProduct {
    /// Creates a product for the given task and payload.
    pub fn new(payload: PayloadType, task_id: Uuid, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            task_id,
            data,
            collected_at: Utc::now(),
        }
    }
}

/// Confidence level of a reconnaissance target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetConfidence {
    /// Detected by wide-area sensing, not yet visually confirmed.
    Detected,
    /// Visually confirmed. Monotonic: never reverts to `Detected`.
    Confirmed,
}

/// A reconnaissance target accumulated over a mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Unique identifier of this target.
    pub id: Uuid,
    /// Last reported ground position.
    pub position: GeoPoint,
    /// Current confidence. Only ever upgraded.
    pub confidence: TargetConfidence,
    /// Free-text description, filled in on confirmation.
    pub detail: Option<String>,
    /// Sensor products that contributed evidence, in intake order.
    pub evidence: Vec<Uuid>,
}

impl Target {
    /// Creates a freshly detected target with one piece of evidence.
    pub fn detected(position: GeoPoint, product_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            confidence: TargetConfidence::Detected,
            detail: None,
            evidence: vec![product_id],
        }
    }

    /// Upgrades the target to `Confirmed` and records evidence. Confidence is
    /// monotonic, so confirming an already-confirmed target only adds evidence.
    pub fn confirm(&mut self, detail: Option<String>, product_id: Uuid) {
        self.confidence = TargetConfidence::Confirmed;
        if detail.is_some() {
            self.detail = detail;
        }
        self.evidence.push(product_id);
    }
}

/// One update emitted by a processing capability, consumed by the
/// orchestrator's target intake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetUpdate {
    /// A new detection at a position with a detector-reported score.
    Detect {
        /// Ground position of the detection.
        position: GeoPoint,
        /// Detector score in `[0, 1]`.
        score: f64,
    },
    /// Visual confirmation at a position. The orchestrator's intake matches
    /// it to the nearest known target; capabilities do not see target ids.
    Confirm {
        /// Ground position of the confirmation.
        position: GeoPoint,
        /// Confirmation description (vehicle type, camouflage, ...).
        detail: String,
    },
}

/// A target area paired with the payloads to fly over it — the planning
/// input every capability sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaOfInterest {
    /// The area to cover.
    pub area: Area,
    /// Points of interest within the area (e.g. prior detections) that a
    /// planner may anchor on. Empty for a first sweep.
    pub focus: Vec<GeoPoint>,
}

impl AreaOfInterest {
    /// An area with no prior focus points.
    pub fn whole(area: Area) -> Self {
        Self { area, focus: Vec::new() }
    }
}
