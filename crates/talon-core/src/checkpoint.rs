//! Checkpoint types for human-in-the-loop mission gates.
//!
//! These live in `talon-core` so that the orchestrator's gate and any front
//! end resolving checkpoints (CLI, future API) can share them without
//! circular dependencies.

use crate::geo::Area;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Adjustment supplied with a `Modified` resolution, applied to the next
/// task's parameters before it is planned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskAdjustment {
    /// Replace the task's target area.
    pub area: Option<Area>,
    /// Override the planner's default altitude.
    pub altitude_m: Option<f64>,
    /// Reviewer note, carried into the mission log.
    pub note: Option<String>,
}

/// The decision an external reviewer hands back for a checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Resolution {
    /// Continue the mission unchanged.
    Approved,
    /// Continue, applying the adjustment to the next task.
    Modified(TaskAdjustment),
    /// Abort the mission.
    Rejected,
}

/// Stored decision state of a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    /// Raised, awaiting an external decision.
    Pending,
    /// Resolved: continue.
    Approved,
    /// Resolved: continue with an adjustment.
    Modified,
    /// Resolved: abort.
    Rejected,
}

impl From<&Resolution> for CheckpointStatus {
    fn from(r: &Resolution) -> Self {
        match r {
            Resolution::Approved => CheckpointStatus::Approved,
            Resolution::Modified(_) => CheckpointStatus::Modified,
            Resolution::Rejected => CheckpointStatus::Rejected,
        }
    }
}

/// A durable record of one human-decision suspension point.
///
/// Created by the orchestrator when a policy-designated decision point is
/// reached; resolved exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Unique identifier of this checkpoint.
    pub id: Uuid,
    /// The mission suspended on this checkpoint.
    pub mission_id: Uuid,
    /// Why the mission paused (e.g. "SAR detections before EO confirmation").
    pub reason: String,
    /// UTC timestamp of the suspension.
    pub requested_at: DateTime<Utc>,
    /// Current decision state.
    pub status: CheckpointStatus,
}

impl Checkpoint {
    /// Creates a pending checkpoint for a mission.
    pub fn pending(mission_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mission_id,
            reason: reason.into(),
            requested_at: Utc::now(),
            status: CheckpointStatus::Pending,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_checkpoint() {
        let cp = Checkpoint::pending(Uuid::new_v4(), "review SAR detections");
        assert_eq!(cp.status, CheckpointStatus::Pending);
        assert_eq!(cp.reason, "review SAR detections");
    }

    #[test]
    fn test_status_from_resolution() {
        assert_eq!(CheckpointStatus::from(&Resolution::Approved), CheckpointStatus::Approved);
        assert_eq!(
            CheckpointStatus::from(&Resolution::Modified(TaskAdjustment::default())),
            CheckpointStatus::Modified
        );
        assert_eq!(CheckpointStatus::from(&Resolution::Rejected), CheckpointStatus::Rejected);
    }

    #[test]
    fn test_resolution_serialization() {
        let res = Resolution::Modified(TaskAdjustment {
            altitude_m: Some(2500.0),
            ..TaskAdjustment::default()
        });
        let json = serde_json::to_string(&res).unwrap();
        assert!(json.contains("modified"));
        let parsed: Resolution = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, res);
    }
}
