use crate::gate::CheckpointGate;
use crate::log::{EventKind, MissionLog};
use crate::policy::EngineConfig;
use crate::types::{Mission, MissionSpec, MissionStatus, StatusReport, TaskPhase};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use talon_capability::CapabilityRegistry;
use talon_core::{
    AreaOfInterest, Checkpoint, Resolution, Route, SensorProduct, TalonError, TalonResult,
    TargetUpdate, TaskAdjustment, VehicleAction, VehicleEventKind, VehiclePhase,
};
use talon_sim::{Fleet, NotificationBridge, VehicleHandle, VehicleLease};
use tokio::sync::{broadcast, watch, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

/// The mission workflow engine.
///
/// Owns all mission state; callers interact only through submission, status
/// queries, checkpoint resolution, and abort. Each submitted mission runs on
/// its own driver task, stepping plan → dispatch → collect → process per
/// task, with retry/backoff for capability failures and suspension at
/// policy-designated human checkpoints.
pub struct MissionEngine {
    fleet: Arc<Fleet>,
    registry: Arc<CapabilityRegistry>,
    gate: Arc<CheckpointGate>,
    log: Arc<MissionLog>,
    config: EngineConfig,
    missions: RwLock<HashMap<Uuid, MissionEntry>>,
}

struct MissionEntry {
    mission: Mission,
    abort_tx: watch::Sender<bool>,
    status_tx: watch::Sender<MissionStatus>,
}

enum Raced<T> {
    Done(T),
    Aborted,
}

async fn wait_for_abort(rx: &mut watch::Receiver<bool>) {
    // A closed sender means the engine itself is gone; park rather than
    // fabricating an abort.
    if rx.wait_for(|aborted| *aborted).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Runs `fut` unless the mission's abort flag is (or becomes) set.
async fn race_abort<T>(
    abort_rx: &mut watch::Receiver<bool>,
    fut: impl std::future::Future<Output = T>,
) -> Raced<T> {
    tokio::select! {
        biased;
        _ = wait_for_abort(abort_rx) => Raced::Aborted,
        out = fut => Raced::Done(out),
    }
}

impl MissionEngine {
    /// Creates an engine over a fleet, capability registry, checkpoint gate,
    /// and mission log.
    pub fn new(
        fleet: Arc<Fleet>,
        registry: Arc<CapabilityRegistry>,
        gate: Arc<CheckpointGate>,
        log: Arc<MissionLog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            fleet,
            registry,
            gate,
            log,
            config,
            missions: RwLock::new(HashMap::new()),
        }
    }

    /// The checkpoint gate, for front ends that list and resolve checkpoints.
    pub fn gate(&self) -> &Arc<CheckpointGate> {
        &self.gate
    }

    /// The mission log.
    pub fn log(&self) -> &Arc<MissionLog> {
        &self.log
    }

    /// Accepts a mission and starts driving it.
    ///
    /// Validation failures (empty payload sequence, ordering violation) and
    /// payloads without registered capabilities are rejected before any task
    /// state exists.
    pub async fn submit(self: &Arc<Self>, spec: MissionSpec) -> TalonResult<Uuid> {
        spec.validate()?;
        for payload in &spec.payload_sequence {
            if !self.registry.covers(*payload) {
                return Err(TalonError::Capability {
                    message: format!("no capabilities registered for payload {payload}"),
                    retryable: false,
                });
            }
        }

        let mission = Mission::from_spec(&spec);
        let mission_id = mission.id;
        self.log.record(
            mission_id,
            EventKind::MissionSubmitted,
            serde_json::json!({
                "tasks": mission.tasks.len(),
                "payloads": spec.payload_sequence,
            }),
        );
        info!(mission_id = %mission_id, tasks = mission.tasks.len(), "mission submitted");

        let (abort_tx, abort_rx) = watch::channel(false);
        let (status_tx, _) = watch::channel(mission.status);
        self.missions.write().await.insert(
            mission_id,
            MissionEntry {
                mission,
                abort_tx,
                status_tx,
            },
        );

        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.drive(mission_id, abort_rx).await;
        });
        Ok(mission_id)
    }

    /// Snapshot status report for a mission.
    pub async fn status(&self, mission_id: Uuid) -> TalonResult<StatusReport> {
        let missions = self.missions.read().await;
        let entry = missions
            .get(&mission_id)
            .ok_or_else(|| TalonError::Mission(format!("unknown mission {mission_id}")))?;
        Ok(StatusReport::of(&entry.mission))
    }

    /// Full snapshot of a mission, including targets and task detail.
    pub async fn mission(&self, mission_id: Uuid) -> TalonResult<Mission> {
        let missions = self.missions.read().await;
        missions
            .get(&mission_id)
            .map(|e| e.mission.clone())
            .ok_or_else(|| TalonError::Mission(format!("unknown mission {mission_id}")))
    }

    /// Requests an abort. The driver observes the flag at its next await
    /// point, commands the vehicle home if one is held, and finishes the
    /// mission as `Aborted`.
    pub async fn abort(&self, mission_id: Uuid) -> TalonResult<()> {
        let missions = self.missions.read().await;
        let entry = missions
            .get(&mission_id)
            .ok_or_else(|| TalonError::Mission(format!("unknown mission {mission_id}")))?;
        if entry.mission.status.is_terminal() {
            return Err(TalonError::Mission(format!(
                "mission {mission_id} already finished as {}",
                entry.mission.status
            )));
        }
        warn!(mission_id = %mission_id, "mission abort requested");
        let _ = entry.abort_tx.send(true);
        Ok(())
    }

    /// Hands a reviewer decision to a suspended mission.
    pub async fn resolve_checkpoint(&self, id: Uuid, resolution: Resolution) -> TalonResult<()> {
        self.gate.resolve(id, resolution).await
    }

    /// Suspends until the mission reaches a terminal status and returns it.
    pub async fn wait(&self, mission_id: Uuid) -> TalonResult<MissionStatus> {
        let mut rx = {
            let missions = self.missions.read().await;
            let entry = missions
                .get(&mission_id)
                .ok_or_else(|| TalonError::Mission(format!("unknown mission {mission_id}")))?;
            if entry.mission.status.is_terminal() {
                return Ok(entry.mission.status);
            }
            entry.status_tx.subscribe()
        };
        let status = rx
            .wait_for(|status| status.is_terminal())
            .await
            .map_err(|_| TalonError::Mission(format!("mission {mission_id} driver vanished")))?;
        Ok(*status)
    }

    async fn with_mission<T>(
        &self,
        mission_id: Uuid,
        f: impl FnOnce(&mut Mission) -> T,
    ) -> TalonResult<T> {
        let mut missions = self.missions.write().await;
        let entry = missions
            .get_mut(&mission_id)
            .ok_or_else(|| TalonError::Mission(format!("unknown mission {mission_id}")))?;
        Ok(f(&mut entry.mission))
    }

    async fn set_status(&self, mission_id: Uuid, status: MissionStatus) -> TalonResult<()> {
        {
            let mut missions = self.missions.write().await;
            let entry = missions
                .get_mut(&mission_id)
                .ok_or_else(|| TalonError::Mission(format!("unknown mission {mission_id}")))?;
            entry.mission.status = status;
            if status.is_terminal() {
                entry.mission.finished_at = Some(Utc::now());
            }
            let _ = entry.status_tx.send(status);
        }
        self.log.record(
            mission_id,
            EventKind::MissionStatus,
            serde_json::json!({ "status": status }),
        );
        Ok(())
    }

    async fn set_task_phase(
        &self,
        mission_id: Uuid,
        index: usize,
        phase: TaskPhase,
    ) -> TalonResult<()> {
        let task_id = self
            .with_mission(mission_id, |m| {
                let task = &mut m.tasks[index];
                task.phase = phase;
                if phase.is_terminal() {
                    task.completed_at = Some(Utc::now());
                }
                task.id
            })
            .await?;
        self.log.record(
            mission_id,
            EventKind::TaskPhase,
            serde_json::json!({ "task_id": task_id, "phase": phase }),
        );
        Ok(())
    }

    async fn fail_task(&self, mission_id: Uuid, index: usize, reason: String) -> TalonResult<()> {
        error!(mission_id = %mission_id, task = index, reason = %reason, "task failed");
        self.with_mission(mission_id, |m| {
            m.tasks[index].failure = Some(reason);
        })
        .await?;
        self.set_task_phase(mission_id, index, TaskPhase::Failed).await
    }

    async fn drive(self: Arc<Self>, mission_id: Uuid, mut abort_rx: watch::Receiver<bool>) {
        let final_status = match self.drive_inner(mission_id, &mut abort_rx).await {
            Ok(status) => status,
            Err(e) => {
                error!(mission_id = %mission_id, error = %e, "mission driver error");
                MissionStatus::Failed
            }
        };
        if let Err(e) = self.set_status(mission_id, final_status).await {
            error!(mission_id = %mission_id, error = %e, "failed to record final status");
        }
        info!(mission_id = %mission_id, status = %final_status, "mission finished");
    }

    async fn drive_inner(
        &self,
        mission_id: Uuid,
        abort_rx: &mut watch::Receiver<bool>,
    ) -> TalonResult<MissionStatus> {
        self.set_status(mission_id, MissionStatus::Planning).await?;

        let (task_count, policy) = self
            .with_mission(mission_id, |m| (m.tasks.len(), m.checkpoint_policy.clone()))
            .await?;
        let mut adjustment: Option<TaskAdjustment> = None;

        for index in 0..task_count {
            if *abort_rx.borrow() {
                return Ok(MissionStatus::Aborted);
            }

            // A `Modified` checkpoint resolution adjusts this task before it
            // is planned.
            let altitude_override = match adjustment.take() {
                Some(adj) => {
                    if let Some(area) = adj.area {
                        self.with_mission(mission_id, |m| m.tasks[index].area = area.clone())
                            .await?;
                    }
                    if let Some(note) = &adj.note {
                        info!(mission_id = %mission_id, note = %note, "reviewer adjustment applied");
                    }
                    adj.altitude_m
                }
                None => None,
            };

            let (payload, aoi) = self
                .with_mission(mission_id, |m| {
                    let focus = m.target_positions();
                    let task = &m.tasks[index];
                    (
                        task.payload,
                        AreaOfInterest {
                            area: task.area.clone(),
                            focus,
                        },
                    )
                })
                .await?;

            // Plan.
            let mut route = match self.plan_with_retry(mission_id, index, payload, &aoi, abort_rx).await? {
                Raced::Done(Some(route)) => route,
                Raced::Done(None) => return Ok(MissionStatus::Failed),
                Raced::Aborted => return Ok(MissionStatus::Aborted),
            };
            if let Some(altitude) = altitude_override {
                for wp in &mut route.waypoints {
                    wp.altitude_m = altitude;
                }
            }
            self.with_mission(mission_id, |m| m.tasks[index].route = Some(route.clone()))
                .await?;
            self.set_task_phase(mission_id, index, TaskPhase::Planned).await?;
            if index == 0 {
                self.set_status(mission_id, MissionStatus::Executing).await?;
            }

            // Dispatch, collect, process. The lease is held across all three
            // and released when this scope ends.
            let (handle, lease) = match self.acquire_with_retry(mission_id, index, abort_rx).await? {
                Raced::Done(Some(pair)) => pair,
                Raced::Done(None) => return Ok(MissionStatus::Failed),
                Raced::Aborted => return Ok(MissionStatus::Aborted),
            };
            let mut bridge = NotificationBridge::new(handle.id(), handle.subscribe());
            spawn_flight_logger(
                Arc::clone(&self.log),
                mission_id,
                handle.id(),
                handle.subscribe(),
            );

            let task_id = self.with_mission(mission_id, |m| m.tasks[index].id).await?;
            match self
                .launch(mission_id, index, &handle, &mut bridge, route, task_id, abort_rx)
                .await?
            {
                Raced::Done(true) => {}
                Raced::Done(false) => return Ok(MissionStatus::Failed),
                Raced::Aborted => {
                    self.send_home(&handle).await;
                    return Ok(MissionStatus::Aborted);
                }
            }
            self.set_task_phase(mission_id, index, TaskPhase::Dispatched).await?;

            // Collect.
            match race_abort(
                abort_rx,
                bridge.await_phase(VehiclePhase::OnStation, self.config.phase_wait()),
            )
            .await
            {
                Raced::Done(Ok(_)) => {}
                Raced::Done(Err(e)) => {
                    self.send_home(&handle).await;
                    self.fail_task(mission_id, index, e.to_string()).await?;
                    return Ok(MissionStatus::Failed);
                }
                Raced::Aborted => {
                    self.send_home(&handle).await;
                    return Ok(MissionStatus::Aborted);
                }
            }
            self.set_task_phase(mission_id, index, TaskPhase::Collecting).await?;

            let product = match race_abort(
                abort_rx,
                bridge.await_product(self.config.phase_wait()),
            )
            .await
            {
                Raced::Done(Ok(product)) => product,
                Raced::Done(Err(e)) => {
                    self.send_home(&handle).await;
                    self.fail_task(mission_id, index, e.to_string()).await?;
                    return Ok(MissionStatus::Failed);
                }
                Raced::Aborted => {
                    self.send_home(&handle).await;
                    return Ok(MissionStatus::Aborted);
                }
            };
            self.log.record(
                mission_id,
                EventKind::ProductCollected,
                serde_json::json!({
                    "product_id": product.id,
                    "task_id": product.task_id,
                    "payload": product.payload,
                }),
            );

            // Process.
            let updates = match self
                .process_with_retry(mission_id, index, payload, &product, abort_rx)
                .await?
            {
                Raced::Done(Some(updates)) => updates,
                Raced::Done(None) => return Ok(MissionStatus::Failed),
                Raced::Aborted => return Ok(MissionStatus::Aborted),
            };

            let touched = self
                .with_mission(mission_id, |m| {
                    m.tasks[index].product = Some(product.clone());
                    m.apply_target_updates(&updates, product.id, self.config.match_tolerance_deg)
                })
                .await?;
            if touched > 0 {
                self.log.record(
                    mission_id,
                    EventKind::TargetUpdate,
                    serde_json::json!({ "task_id": task_id, "targets_touched": touched }),
                );
            }
            self.set_task_phase(mission_id, index, TaskPhase::Processed).await?;
            drop(lease);

            // Checkpoint between payload groups, per policy.
            let next_payload = self
                .with_mission(mission_id, |m| m.tasks.get(index + 1).map(|t| t.payload))
                .await?;
            if policy.due_after(payload, next_payload) {
                match self
                    .run_checkpoint(mission_id, payload, policy.timeout_s, abort_rx, &mut adjustment)
                    .await?
                {
                    Raced::Done(true) => {}
                    Raced::Done(false) => return Ok(MissionStatus::Aborted),
                    Raced::Aborted => return Ok(MissionStatus::Aborted),
                }
            }
        }

        // Every non-terminal exit above returned already; completion requires
        // the full task list processed.
        let all_processed = self
            .with_mission(mission_id, |m| m.all_tasks_processed())
            .await?;
        if !all_processed {
            return Err(TalonError::Mission(format!(
                "mission {mission_id} ran out of tasks with some unprocessed"
            )));
        }
        Ok(MissionStatus::Completed)
    }

    /// Plans the task's route, retrying retryable failures per policy.
    ///
    /// `Done(None)` means the task was marked failed and the mission should
    /// finish as `Failed`.
    async fn plan_with_retry(
        &self,
        mission_id: Uuid,
        index: usize,
        payload: talon_core::PayloadType,
        aoi: &AreaOfInterest,
        abort_rx: &mut watch::Receiver<bool>,
    ) -> TalonResult<Raced<Option<Route>>> {
        let mut attempt = 0u32;
        loop {
            let result = match race_abort(
                abort_rx,
                self.registry.plan(payload, aoi, self.config.capability_deadline()),
            )
            .await
            {
                Raced::Done(result) => result,
                Raced::Aborted => return Ok(Raced::Aborted),
            };
            match result {
                Ok(route) => return Ok(Raced::Done(Some(route))),
                Err(e) if e.is_retryable() && attempt < self.config.retry.max_retries => {
                    attempt += 1;
                    self.with_mission(mission_id, |m| m.tasks[index].retries += 1)
                        .await?;
                    let backoff = self.config.retry.backoff(attempt);
                    warn!(mission_id = %mission_id, task = index, attempt,
                        backoff_ms = backoff.as_millis() as u64, error = %e,
                        "planning failed, retrying");
                    if let Raced::Aborted =
                        race_abort(abort_rx, tokio::time::sleep(backoff)).await
                    {
                        return Ok(Raced::Aborted);
                    }
                }
                Err(e) => {
                    self.fail_task(mission_id, index, format!("planning: {e}")).await?;
                    return Ok(Raced::Done(None));
                }
            }
        }
    }

    /// Processes the product, retrying retryable failures per policy.
    async fn process_with_retry(
        &self,
        mission_id: Uuid,
        index: usize,
        payload: talon_core::PayloadType,
        product: &SensorProduct,
        abort_rx: &mut watch::Receiver<bool>,
    ) -> TalonResult<Raced<Option<Vec<TargetUpdate>>>> {
        let mut attempt = 0u32;
        loop {
            let result = match race_abort(
                abort_rx,
                self.registry
                    .process(payload, product, self.config.capability_deadline()),
            )
            .await
            {
                Raced::Done(result) => result,
                Raced::Aborted => return Ok(Raced::Aborted),
            };
            match result {
                Ok(updates) => return Ok(Raced::Done(Some(updates))),
                Err(e) if e.is_retryable() && attempt < self.config.retry.max_retries => {
                    attempt += 1;
                    self.with_mission(mission_id, |m| m.tasks[index].retries += 1)
                        .await?;
                    let backoff = self.config.retry.backoff(attempt);
                    warn!(mission_id = %mission_id, task = index, attempt,
                        backoff_ms = backoff.as_millis() as u64, error = %e,
                        "processing failed, retrying");
                    if let Raced::Aborted =
                        race_abort(abort_rx, tokio::time::sleep(backoff)).await
                    {
                        return Ok(Raced::Aborted);
                    }
                }
                Err(e) => {
                    self.fail_task(mission_id, index, format!("processing: {e}")).await?;
                    return Ok(Raced::Done(None));
                }
            }
        }
    }

    /// Acquires a vehicle, retrying `VehicleBusy` with a bounded backoff.
    async fn acquire_with_retry(
        &self,
        mission_id: Uuid,
        index: usize,
        abort_rx: &mut watch::Receiver<bool>,
    ) -> TalonResult<Raced<Option<(VehicleHandle, VehicleLease)>>> {
        let mut attempt = 0u32;
        loop {
            match self.fleet.acquire_any(mission_id) {
                Ok(pair) => return Ok(Raced::Done(Some(pair))),
                Err(TalonError::VehicleBusy(_)) if attempt < self.config.acquire_attempts => {
                    attempt += 1;
                    if let Raced::Aborted =
                        race_abort(abort_rx, tokio::time::sleep(self.config.acquire_backoff()))
                            .await
                    {
                        return Ok(Raced::Aborted);
                    }
                }
                Err(e) => {
                    self.fail_task(mission_id, index, format!("acquisition: {e}")).await?;
                    return Ok(Raced::Done(None));
                }
            }
        }
    }

    /// Commands the launch. A vehicle acquired while still flying home from
    /// a previous task rejects the launch; wait for it to reach ground and
    /// retry once.
    #[allow(clippy::too_many_arguments)]
    async fn launch(
        &self,
        mission_id: Uuid,
        index: usize,
        handle: &VehicleHandle,
        bridge: &mut NotificationBridge,
        route: Route,
        task_id: Uuid,
        abort_rx: &mut watch::Receiver<bool>,
    ) -> TalonResult<Raced<bool>> {
        let action = VehicleAction::Launch {
            route: route.clone(),
            task_id,
        };
        let first = match race_abort(abort_rx, handle.command(action)).await {
            Raced::Done(result) => result,
            Raced::Aborted => return Ok(Raced::Aborted),
        };
        match first {
            Ok(()) => Ok(Raced::Done(true)),
            Err(TalonError::InvalidTransition { phase, .. }) => {
                info!(mission_id = %mission_id, vehicle_id = %handle.id(), phase = %phase,
                    "vehicle not on ground, waiting before relaunch");
                match race_abort(
                    abort_rx,
                    bridge.await_phase(VehiclePhase::Ground, self.config.phase_wait()),
                )
                .await
                {
                    Raced::Done(Ok(_)) => {}
                    Raced::Done(Err(e)) => {
                        self.fail_task(mission_id, index, format!("dispatch: {e}")).await?;
                        return Ok(Raced::Done(false));
                    }
                    Raced::Aborted => return Ok(Raced::Aborted),
                }
                let retry = VehicleAction::Launch { route, task_id };
                match race_abort(abort_rx, handle.command(retry)).await {
                    Raced::Done(Ok(())) => Ok(Raced::Done(true)),
                    Raced::Done(Err(e)) => {
                        self.fail_task(mission_id, index, format!("dispatch: {e}")).await?;
                        Ok(Raced::Done(false))
                    }
                    Raced::Aborted => Ok(Raced::Aborted),
                }
            }
            Err(e) => {
                self.fail_task(mission_id, index, format!("dispatch: {e}")).await?;
                Ok(Raced::Done(false))
            }
        }
    }

    /// Raises a checkpoint and applies the decision.
    ///
    /// `Done(true)` continues the mission, `Done(false)` means the reviewer
    /// rejected it.
    async fn run_checkpoint(
        &self,
        mission_id: Uuid,
        finished: talon_core::PayloadType,
        timeout_s: Option<u64>,
        abort_rx: &mut watch::Receiver<bool>,
        adjustment: &mut Option<TaskAdjustment>,
    ) -> TalonResult<Raced<bool>> {
        self.set_status(mission_id, MissionStatus::AwaitingApproval).await?;
        let checkpoint = Checkpoint::pending(
            mission_id,
            format!("{finished} tasks complete, review before continuing"),
        );
        let checkpoint_id = checkpoint.id;
        self.log.record(
            mission_id,
            EventKind::CheckpointRaised,
            serde_json::json!({ "checkpoint_id": checkpoint_id, "reason": checkpoint.reason }),
        );

        let timeout = timeout_s.map(std::time::Duration::from_secs);
        let resolution = match race_abort(abort_rx, self.gate.raise(checkpoint, timeout)).await {
            Raced::Done(result) => result?,
            Raced::Aborted => return Ok(Raced::Aborted),
        };
        self.log.record(
            mission_id,
            EventKind::CheckpointResolved,
            serde_json::json!({
                "checkpoint_id": checkpoint_id,
                "decision": talon_core::CheckpointStatus::from(&resolution),
            }),
        );

        match resolution {
            Resolution::Approved => {
                self.set_status(mission_id, MissionStatus::Executing).await?;
                Ok(Raced::Done(true))
            }
            Resolution::Modified(adj) => {
                *adjustment = Some(adj);
                self.set_status(mission_id, MissionStatus::Executing).await?;
                Ok(Raced::Done(true))
            }
            Resolution::Rejected => Ok(Raced::Done(false)),
        }
    }

    /// Best-effort vehicle recall on abort or failure.
    async fn send_home(&self, handle: &VehicleHandle) {
        if let Err(e) = handle.command(VehicleAction::Abort).await {
            warn!(vehicle_id = %handle.id(), error = %e, "vehicle recall failed");
        }
    }
}

/// Logs every vehicle transition for the duration of one flight, on its own
/// subscription so mission-driver waits never miss log entries.
///
/// A vehicle acquired while still flying home from a previous lease emits
/// that flight's tail first; logging starts at this flight's `Takeoff`.
fn spawn_flight_logger(
    log: Arc<MissionLog>,
    mission_id: Uuid,
    vehicle_id: Uuid,
    mut rx: broadcast::Receiver<talon_core::VehicleEvent>,
) {
    tokio::spawn(async move {
        let mut in_flight = false;
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let VehicleEventKind::Transition(state) = &event.kind {
                        if !in_flight {
                            if state.phase != VehiclePhase::Takeoff {
                                continue;
                            }
                            in_flight = true;
                        }
                        log.record(
                            mission_id,
                            EventKind::VehicleTransition,
                            serde_json::json!({
                                "vehicle_id": vehicle_id,
                                "seq": event.seq,
                                "phase": state.phase,
                            }),
                        );
                        if state.phase == VehiclePhase::Ground {
                            break;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
