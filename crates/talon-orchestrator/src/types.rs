use crate::policy::CheckpointPolicy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use talon_core::{
    Area, GeoPoint, PayloadType, Route, SensorProduct, TalonError, TalonResult, Target,
    TargetUpdate,
};
use uuid::Uuid;

/// Overall status of a mission. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    /// Accepted, not yet running.
    Created,
    /// Decomposing into tasks.
    Planning,
    /// Driving tasks.
    Executing,
    /// Suspended on a human checkpoint.
    AwaitingApproval,
    /// All tasks processed.
    Completed,
    /// Cancelled by a reviewer or an external abort.
    Aborted,
    /// A task failed beyond recovery.
    Failed,
}

impl MissionStatus {
    /// Whether this status is final. No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MissionStatus::Completed | MissionStatus::Aborted | MissionStatus::Failed
        )
    }
}

impl std::fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MissionStatus::Created => "created",
            MissionStatus::Planning => "planning",
            MissionStatus::Executing => "executing",
            MissionStatus::AwaitingApproval => "awaiting_approval",
            MissionStatus::Completed => "completed",
            MissionStatus::Aborted => "aborted",
            MissionStatus::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Phase of one task within its mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPhase {
    /// Created, not yet planned.
    Pending,
    /// A route exists.
    Planned,
    /// The vehicle was commanded.
    Dispatched,
    /// On station, awaiting the sensor product.
    Collecting,
    /// Product processed, target updates applied.
    Processed,
    /// Gave up on this task.
    Failed,
}

impl TaskPhase {
    /// Whether the task is finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskPhase::Processed | TaskPhase::Failed)
    }
}

impl std::fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskPhase::Pending => "pending",
            TaskPhase::Planned => "planned",
            TaskPhase::Dispatched => "dispatched",
            TaskPhase::Collecting => "collecting",
            TaskPhase::Processed => "processed",
            TaskPhase::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// One payload-specific plan/execute/process cycle within a mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier of this task.
    pub id: Uuid,
    /// The owning mission.
    pub mission_id: Uuid,
    /// Payload flown for this task.
    pub payload: PayloadType,
    /// Current phase.
    pub phase: TaskPhase,
    /// Area the task covers. Starts as the mission area; a `Modified`
    /// checkpoint resolution may replace it.
    pub area: Area,
    /// The planned route, once planning succeeds.
    pub route: Option<Route>,
    /// The collected product, once processing succeeds.
    pub product: Option<SensorProduct>,
    /// Retry attempts consumed by capability calls for this task.
    pub retries: u32,
    /// Failure reason, when `phase == Failed`.
    pub failure: Option<String>,
    /// UTC creation timestamp.
    pub created_at: DateTime<Utc>,
    /// UTC timestamp of reaching a terminal phase.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a pending task.
    pub fn new(mission_id: Uuid, payload: PayloadType, area: Area) -> Self {
        Self {
            id: Uuid::new_v4(),
            mission_id,
            payload,
            phase: TaskPhase::Pending,
            area,
            route: None,
            product: None,
            retries: 0,
            failure: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// A mission submission: what to cover, with which payloads, and where the
/// mission must pause for review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionSpec {
    /// The target area.
    pub area: Area,
    /// Ordered payloads, one task each.
    pub payload_sequence: Vec<PayloadType>,
    /// Where the mission pauses for a human decision.
    #[serde(default)]
    pub checkpoint_policy: CheckpointPolicy,
}

impl MissionSpec {
    /// Validates the submission.
    ///
    /// The payload sequence must be non-empty and honor the SAR-before-EO
    /// ordering policy: a SAR task may never follow an EO task.
    pub fn validate(&self) -> TalonResult<()> {
        if self.payload_sequence.is_empty() {
            return Err(TalonError::Mission("payload sequence is empty".into()));
        }
        let mut seen_eo = false;
        for payload in &self.payload_sequence {
            match payload {
                PayloadType::Eo => seen_eo = true,
                PayloadType::Sar if seen_eo => {
                    return Err(TalonError::Mission(
                        "ordering policy violated: SAR task after EO task".into(),
                    ));
                }
                PayloadType::Sar => {}
            }
        }
        Ok(())
    }
}

/// One reconnaissance mission: the unit of submission, execution, and
/// archival. Owned exclusively by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    /// Unique identifier of this mission.
    pub id: Uuid,
    /// The target area as submitted.
    pub area: Area,
    /// Current status.
    pub status: MissionStatus,
    /// Ordered task list; order is significant.
    pub tasks: Vec<Task>,
    /// Targets accumulated by processing intake.
    pub targets: Vec<Target>,
    /// The checkpoint policy from the submission.
    pub checkpoint_policy: CheckpointPolicy,
    /// UTC submission timestamp.
    pub created_at: DateTime<Utc>,
    /// UTC timestamp of reaching a terminal status.
    pub finished_at: Option<DateTime<Utc>>,
}

impl Mission {
    /// Builds a mission from a validated spec, one pending task per payload.
    pub fn from_spec(spec: &MissionSpec) -> Self {
        let id = Uuid::new_v4();
        let tasks = spec
            .payload_sequence
            .iter()
            .map(|&payload| Task::new(id, payload, spec.area.clone()))
            .collect();
        Self {
            id,
            area: spec.area.clone(),
            status: MissionStatus::Created,
            tasks,
            targets: Vec::new(),
            checkpoint_policy: spec.checkpoint_policy.clone(),
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Positions of all currently known targets, used as planning focus for
    /// follow-up tasks.
    pub fn target_positions(&self) -> Vec<GeoPoint> {
        self.targets.iter().map(|t| t.position).collect()
    }

    /// Applies processing output to the target list.
    ///
    /// Detections append new `Detected` targets. Confirmations upgrade the
    /// nearest known target within `tolerance_deg`; an unmatched confirmation
    /// becomes a new target that is `Confirmed` outright. Confidence never
    /// downgrades. Returns the number of targets touched.
    pub fn apply_target_updates(
        &mut self,
        updates: &[TargetUpdate],
        product_id: Uuid,
        tolerance_deg: f64,
    ) -> usize {
        let mut touched = 0;
        for update in updates {
            match update {
                TargetUpdate::Detect { position, .. } => {
                    self.targets.push(Target::detected(*position, product_id));
                    touched += 1;
                }
                TargetUpdate::Confirm { position, detail } => {
                    let nearest = self
                        .targets
                        .iter_mut()
                        .map(|t| {
                            let d = ((t.position.lat - position.lat).powi(2)
                                + (t.position.lon - position.lon).powi(2))
                            .sqrt();
                            (d, t)
                        })
                        .filter(|(d, _)| *d <= tolerance_deg)
                        .min_by(|(a, _), (b, _)| a.total_cmp(b));
                    match nearest {
                        Some((_, target)) => {
                            target.confirm(Some(detail.clone()), product_id);
                        }
                        None => {
                            let mut target = Target::detected(*position, product_id);
                            target.confirm(Some(detail.clone()), product_id);
                            self.targets.push(target);
                        }
                    }
                    touched += 1;
                }
            }
        }
        touched
    }

    /// Whether every task reached `Processed`.
    pub fn all_tasks_processed(&self) -> bool {
        self.tasks.iter().all(|t| t.phase == TaskPhase::Processed)
    }
}

/// Per-task slice of a status report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    /// The task's identifier.
    pub id: Uuid,
    /// The task's payload.
    pub payload: PayloadType,
    /// The task's phase at report time.
    pub phase: TaskPhase,
    /// Capability retries consumed so far.
    pub retries: u32,
}

/// Snapshot answer to a status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    /// The queried mission.
    pub mission_id: Uuid,
    /// Mission status at report time.
    pub status: MissionStatus,
    /// Per-task phases, in task order.
    pub tasks: Vec<TaskReport>,
    /// Targets recorded so far.
    pub targets: Vec<Target>,
}

impl StatusReport {
    /// Builds a report from a mission snapshot.
    pub fn of(mission: &Mission) -> Self {
        Self {
            mission_id: mission.id,
            status: mission.status,
            tasks: mission
                .tasks
                .iter()
                .map(|t| TaskReport {
                    id: t.id,
                    payload: t.payload,
                    phase: t.phase,
                    retries: t.retries,
                })
                .collect(),
            targets: mission.targets.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use talon_core::TargetConfidence;

    fn area() -> Area {
        Area::from_bounds(35.18, 35.12, 117.55, 117.45)
    }

    fn spec(payloads: Vec<PayloadType>) -> MissionSpec {
        MissionSpec {
            area: area(),
            payload_sequence: payloads,
            checkpoint_policy: CheckpointPolicy::default(),
        }
    }

    #[test]
    fn test_spec_validation_ordering() {
        assert!(spec(vec![PayloadType::Sar, PayloadType::Eo]).validate().is_ok());
        assert!(spec(vec![PayloadType::Sar]).validate().is_ok());
        assert!(spec(vec![PayloadType::Eo]).validate().is_ok());
        assert!(spec(vec![PayloadType::Eo, PayloadType::Sar]).validate().is_err());
        assert!(spec(vec![]).validate().is_err());
    }

    #[test]
    fn test_mission_from_spec() {
        let mission = Mission::from_spec(&spec(vec![PayloadType::Sar, PayloadType::Eo]));
        assert_eq!(mission.status, MissionStatus::Created);
        assert_eq!(mission.tasks.len(), 2);
        assert_eq!(mission.tasks[0].payload, PayloadType::Sar);
        assert_eq!(mission.tasks[1].payload, PayloadType::Eo);
        assert!(mission.tasks.iter().all(|t| t.phase == TaskPhase::Pending));
        assert!(mission.tasks.iter().all(|t| t.mission_id == mission.id));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(MissionStatus::Completed.is_terminal());
        assert!(MissionStatus::Aborted.is_terminal());
        assert!(MissionStatus::Failed.is_terminal());
        assert!(!MissionStatus::Executing.is_terminal());
        assert!(!MissionStatus::AwaitingApproval.is_terminal());
    }

    #[test]
    fn test_intake_detect_then_confirm() {
        let mut mission = Mission::from_spec(&spec(vec![PayloadType::Sar]));
        let sar_product = Uuid::new_v4();
        let eo_product = Uuid::new_v4();

        let detected = mission.apply_target_updates(
            &[TargetUpdate::Detect {
                position: GeoPoint::new(35.1234, 117.5678),
                score: 0.87,
            }],
            sar_product,
            0.05,
        );
        assert_eq!(detected, 1);
        assert_eq!(mission.targets[0].confidence, TargetConfidence::Detected);

        // Confirmation near the detection upgrades it rather than adding.
        mission.apply_target_updates(
            &[TargetUpdate::Confirm {
                position: GeoPoint::new(35.1236, 117.5680),
                detail: "armored vehicle".into(),
            }],
            eo_product,
            0.05,
        );
        assert_eq!(mission.targets.len(), 1);
        assert_eq!(mission.targets[0].confidence, TargetConfidence::Confirmed);
        assert_eq!(mission.targets[0].evidence, vec![sar_product, eo_product]);
    }

    #[test]
    fn test_intake_unmatched_confirmation_creates_target() {
        let mut mission = Mission::from_spec(&spec(vec![PayloadType::Eo]));
        mission.apply_target_updates(
            &[TargetUpdate::Confirm {
                position: GeoPoint::new(40.0, 110.0),
                detail: "unexpected sighting".into(),
            }],
            Uuid::new_v4(),
            0.05,
        );
        assert_eq!(mission.targets.len(), 1);
        assert_eq!(mission.targets[0].confidence, TargetConfidence::Confirmed);
    }

    #[test]
    fn test_status_report_snapshot() {
        let mission = Mission::from_spec(&spec(vec![PayloadType::Sar, PayloadType::Eo]));
        let report = StatusReport::of(&mission);
        assert_eq!(report.mission_id, mission.id);
        assert_eq!(report.tasks.len(), 2);
        assert_eq!(report.tasks[0].phase, TaskPhase::Pending);
        assert!(report.targets.is_empty());
    }
}
