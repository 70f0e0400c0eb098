//! End-to-end mission runs against the simulated fleet and built-in
//! capabilities.

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use talon_capability::builtin::{EoConfirmer, GridScanPlanner, OrbitPlanner, SarDetector};
use talon_capability::{CapabilityDescriptor, CapabilityRegistry, ProcessingCapability};
use talon_core::{
    Area, PayloadType, Resolution, SensorProduct, TalonError, TalonResult, TargetConfidence,
    TargetUpdate, TaskAdjustment, VehiclePhase,
};
use talon_orchestrator::{
    CheckpointGate, CheckpointPolicy, EngineConfig, EventKind, MissionEngine, MissionLog,
    MissionStatus, RetryPolicy, TaskPhase,
};
use talon_sim::{Fleet, SimPolicy, VehicleSimulator};
use uuid::Uuid;

fn fast_config() -> EngineConfig {
    EngineConfig {
        retry: RetryPolicy {
            initial_backoff_ms: 10,
            max_backoff_ms: 50,
            ..RetryPolicy::default()
        },
        acquire_attempts: 100,
        acquire_backoff_ms: 10,
        ..EngineConfig::default()
    }
}

fn full_registry() -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    registry.register_planner(Arc::new(GridScanPlanner::new()));
    registry.register_planner(Arc::new(OrbitPlanner::new()));
    registry.register_processor(Arc::new(SarDetector::new()));
    registry.register_processor(Arc::new(EoConfirmer::new()));
    registry
}

struct Harness {
    engine: Arc<MissionEngine>,
    fleet: Arc<Fleet>,
    vehicle_id: Uuid,
    _dir: tempfile::TempDir,
}

fn harness_with(registry: CapabilityRegistry, sim: SimPolicy) -> Harness {
    let fleet = Arc::new(Fleet::new());
    let handle = VehicleSimulator::spawn(sim);
    let vehicle_id = handle.id();
    fleet.register(handle);

    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(MissionLog::open(dir.path().join("mission.jsonl")).unwrap());
    let engine = Arc::new(MissionEngine::new(
        Arc::clone(&fleet),
        Arc::new(registry),
        Arc::new(CheckpointGate::in_memory()),
        log,
        fast_config(),
    ));
    Harness {
        engine,
        fleet,
        vehicle_id,
        _dir: dir,
    }
}

fn harness() -> Harness {
    harness_with(full_registry(), SimPolicy::seeded(11))
}

fn spec(payloads: Vec<PayloadType>, checkpoints: CheckpointPolicy) -> talon_orchestrator::MissionSpec {
    talon_orchestrator::MissionSpec {
        area: Area::from_bounds(35.18, 35.12, 117.55, 117.45),
        payload_sequence: payloads,
        checkpoint_policy: checkpoints,
    }
}

/// Polls the gate until a checkpoint shows up.
async fn next_checkpoint(engine: &MissionEngine) -> Uuid {
    for _ in 0..500 {
        let pending = engine.gate().pending().await.unwrap();
        if let Some(first) = pending.first() {
            return first.id;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no checkpoint raised");
}

#[tokio::test]
async fn test_single_sar_mission_completes_with_detection() {
    let h = harness();
    let mission_id = h
        .engine
        .submit(spec(vec![PayloadType::Sar], CheckpointPolicy::none()))
        .await
        .unwrap();

    let status = h.engine.wait(mission_id).await.unwrap();
    assert_eq!(status, MissionStatus::Completed);

    let mission = h.engine.mission(mission_id).await.unwrap();
    assert_eq!(mission.tasks.len(), 1);
    assert_eq!(mission.tasks[0].phase, TaskPhase::Processed);
    assert!(mission.tasks[0].route.is_some());

    // The fabricated SAR data has one hit above threshold and one below.
    assert_eq!(mission.targets.len(), 1);
    assert_eq!(mission.targets[0].confidence, TargetConfidence::Detected);

    // The product ties back to the task that flew it.
    let product = mission.tasks[0].product.as_ref().unwrap();
    assert_eq!(product.task_id, mission.tasks[0].id);
    assert_eq!(product.payload, PayloadType::Sar);
}

#[tokio::test]
async fn test_sar_then_eo_with_approved_checkpoint() {
    let h = harness();
    let mission_id = h
        .engine
        .submit(spec(
            vec![PayloadType::Sar, PayloadType::Eo],
            CheckpointPolicy::after_payload(PayloadType::Sar),
        ))
        .await
        .unwrap();

    let checkpoint_id = next_checkpoint(&h.engine).await;
    let report = h.engine.status(mission_id).await.unwrap();
    assert_eq!(report.status, MissionStatus::AwaitingApproval);
    assert_eq!(report.tasks[0].phase, TaskPhase::Processed);
    assert_eq!(report.tasks[1].phase, TaskPhase::Pending);

    h.engine
        .resolve_checkpoint(checkpoint_id, Resolution::Approved)
        .await
        .unwrap();

    let status = h.engine.wait(mission_id).await.unwrap();
    assert_eq!(status, MissionStatus::Completed);

    // The EO orbit anchors on the SAR detection and confirms it.
    let mission = h.engine.mission(mission_id).await.unwrap();
    assert_eq!(mission.targets.len(), 1);
    assert_eq!(mission.targets[0].confidence, TargetConfidence::Confirmed);
    assert_eq!(
        mission.targets[0].detail.as_deref(),
        Some("tracked vehicle under camouflage netting")
    );
    assert_eq!(mission.targets[0].evidence.len(), 2);
}

#[tokio::test]
async fn test_rejected_checkpoint_aborts_before_next_task() {
    let h = harness();
    let mission_id = h
        .engine
        .submit(spec(
            vec![PayloadType::Sar, PayloadType::Eo],
            CheckpointPolicy::after_payload(PayloadType::Sar),
        ))
        .await
        .unwrap();

    let checkpoint_id = next_checkpoint(&h.engine).await;
    h.engine
        .resolve_checkpoint(checkpoint_id, Resolution::Rejected)
        .await
        .unwrap();

    let status = h.engine.wait(mission_id).await.unwrap();
    assert_eq!(status, MissionStatus::Aborted);

    // The EO task was never dispatched.
    let mission = h.engine.mission(mission_id).await.unwrap();
    assert_eq!(mission.tasks[1].phase, TaskPhase::Pending);
    assert!(mission.tasks[1].route.is_none());
    assert_eq!(h.fleet.owner(h.vehicle_id), None);
}

#[tokio::test]
async fn test_modified_checkpoint_replaces_next_area() {
    let h = harness();
    let mission_id = h
        .engine
        .submit(spec(
            vec![PayloadType::Sar, PayloadType::Eo],
            CheckpointPolicy::after_payload(PayloadType::Sar),
        ))
        .await
        .unwrap();

    let checkpoint_id = next_checkpoint(&h.engine).await;
    let narrowed = Area::from_bounds(35.15, 35.13, 117.50, 117.48);
    h.engine
        .resolve_checkpoint(
            checkpoint_id,
            Resolution::Modified(TaskAdjustment {
                area: Some(narrowed.clone()),
                altitude_m: Some(2500.0),
                note: Some("tighten around the detection".into()),
            }),
        )
        .await
        .unwrap();

    let status = h.engine.wait(mission_id).await.unwrap();
    assert_eq!(status, MissionStatus::Completed);

    let mission = h.engine.mission(mission_id).await.unwrap();
    assert_eq!(mission.tasks[1].area, narrowed);
    let route = mission.tasks[1].route.as_ref().unwrap();
    assert!(route.waypoints.iter().all(|wp| wp.altitude_m == 2500.0));
}

#[tokio::test]
async fn test_vehicle_fault_fails_mission_and_releases_lease() {
    let sim = SimPolicy {
        fail_at: Some(VehiclePhase::OnStation),
        ..SimPolicy::fast()
    };
    let h = harness_with(full_registry(), sim);
    let mission_id = h
        .engine
        .submit(spec(vec![PayloadType::Sar], CheckpointPolicy::none()))
        .await
        .unwrap();

    let status = h.engine.wait(mission_id).await.unwrap();
    assert_eq!(status, MissionStatus::Failed);

    let mission = h.engine.mission(mission_id).await.unwrap();
    assert_eq!(mission.tasks[0].phase, TaskPhase::Failed);
    assert!(mission.tasks[0].failure.as_ref().unwrap().contains("fault"));
    assert_eq!(h.fleet.owner(h.vehicle_id), None);
}

/// Fails a fixed number of times with a retryable error, then succeeds.
struct FlakyProcessor {
    descriptor: CapabilityDescriptor,
    failures_left: AtomicU32,
    inner: SarDetector,
}

impl FlakyProcessor {
    fn new(failures: u32) -> Self {
        Self {
            descriptor: CapabilityDescriptor {
                name: "flaky_sar_detector".into(),
                description: "fails transiently before succeeding".into(),
                payload: PayloadType::Sar,
            },
            failures_left: AtomicU32::new(failures),
            inner: SarDetector::new(),
        }
    }
}

#[async_trait]
impl ProcessingCapability for FlakyProcessor {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn process(&self, product: &SensorProduct) -> TalonResult<Vec<TargetUpdate>> {
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(TalonError::Capability {
                message: "transient processing hiccup".into(),
                retryable: true,
            });
        }
        self.inner.process(product).await
    }
}

#[tokio::test]
async fn test_retryable_processing_failures_are_retried() {
    let mut registry = CapabilityRegistry::new();
    registry.register_planner(Arc::new(GridScanPlanner::new()));
    registry.register_processor(Arc::new(FlakyProcessor::new(2)));
    let h = harness_with(registry, SimPolicy::seeded(11));

    let mission_id = h
        .engine
        .submit(spec(vec![PayloadType::Sar], CheckpointPolicy::none()))
        .await
        .unwrap();
    let status = h.engine.wait(mission_id).await.unwrap();
    assert_eq!(status, MissionStatus::Completed);

    let mission = h.engine.mission(mission_id).await.unwrap();
    assert_eq!(mission.tasks[0].phase, TaskPhase::Processed);
    assert_eq!(mission.tasks[0].retries, 2);
}

#[tokio::test]
async fn test_retries_exhausted_fails_the_mission() {
    let mut registry = CapabilityRegistry::new();
    registry.register_planner(Arc::new(GridScanPlanner::new()));
    // More failures than max_retries allows.
    registry.register_processor(Arc::new(FlakyProcessor::new(10)));
    let h = harness_with(registry, SimPolicy::seeded(11));

    let mission_id = h
        .engine
        .submit(spec(vec![PayloadType::Sar], CheckpointPolicy::none()))
        .await
        .unwrap();
    let status = h.engine.wait(mission_id).await.unwrap();
    assert_eq!(status, MissionStatus::Failed);

    let mission = h.engine.mission(mission_id).await.unwrap();
    assert_eq!(mission.tasks[0].phase, TaskPhase::Failed);
    assert_eq!(mission.tasks[0].retries, 3);
}

#[tokio::test]
async fn test_checkpoint_resolves_exactly_once() {
    let h = harness();
    let mission_id = h
        .engine
        .submit(spec(
            vec![PayloadType::Sar, PayloadType::Eo],
            CheckpointPolicy::after_payload(PayloadType::Sar),
        ))
        .await
        .unwrap();

    let checkpoint_id = next_checkpoint(&h.engine).await;
    h.engine
        .resolve_checkpoint(checkpoint_id, Resolution::Approved)
        .await
        .unwrap();

    let err = h
        .engine
        .resolve_checkpoint(checkpoint_id, Resolution::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, TalonError::AlreadyResolved(id) if id == checkpoint_id));

    // The first decision stands: the mission completes.
    let status = h.engine.wait(mission_id).await.unwrap();
    assert_eq!(status, MissionStatus::Completed);
}

#[tokio::test]
async fn test_concurrent_missions_share_one_vehicle() {
    let h = harness();
    let first = h
        .engine
        .submit(spec(vec![PayloadType::Sar], CheckpointPolicy::none()))
        .await
        .unwrap();
    let second = h
        .engine
        .submit(spec(vec![PayloadType::Sar], CheckpointPolicy::none()))
        .await
        .unwrap();

    let (a, b) = tokio::join!(h.engine.wait(first), h.engine.wait(second));
    assert_eq!(a.unwrap(), MissionStatus::Completed);
    assert_eq!(b.unwrap(), MissionStatus::Completed);
    assert_eq!(h.fleet.owner(h.vehicle_id), None);
}

#[tokio::test]
async fn test_abort_while_suspended_on_checkpoint() {
    let h = harness();
    let mission_id = h
        .engine
        .submit(spec(
            vec![PayloadType::Sar, PayloadType::Eo],
            CheckpointPolicy::after_payload(PayloadType::Sar),
        ))
        .await
        .unwrap();

    next_checkpoint(&h.engine).await;
    h.engine.abort(mission_id).await.unwrap();

    let status = h.engine.wait(mission_id).await.unwrap();
    assert_eq!(status, MissionStatus::Aborted);

    // Aborting a finished mission is rejected.
    let err = h.engine.abort(mission_id).await.unwrap_err();
    assert!(matches!(err, TalonError::Mission(_)));
}

#[tokio::test]
async fn test_log_replay_reconstructs_mission_history() {
    let h = harness();
    let mission_id = h
        .engine
        .submit(spec(vec![PayloadType::Sar], CheckpointPolicy::none()))
        .await
        .unwrap();
    let status = h.engine.wait(mission_id).await.unwrap();
    assert_eq!(status, MissionStatus::Completed);

    h.engine.log().sync().await.unwrap();
    let events = h.engine.log().read_all().unwrap();
    let kinds: Vec<EventKind> = events
        .iter()
        .filter(|e| e.mission_id == mission_id)
        .map(|e| e.kind)
        .collect();

    assert_eq!(kinds[0], EventKind::MissionSubmitted);
    assert!(kinds.contains(&EventKind::TaskPhase));
    assert!(kinds.contains(&EventKind::VehicleTransition));
    assert!(kinds.contains(&EventKind::ProductCollected));
    assert!(kinds.contains(&EventKind::TargetUpdate));

    // The last status entry is the terminal one.
    let last_status = events
        .iter()
        .filter(|e| e.mission_id == mission_id && e.kind == EventKind::MissionStatus)
        .next_back()
        .unwrap();
    assert_eq!(last_status.payload["status"], "completed");

    // Timestamps never go backwards.
    for pair in events.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}
