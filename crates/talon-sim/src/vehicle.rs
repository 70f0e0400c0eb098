use crate::config::SimPolicy;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use talon_core::{
    GeoPoint, PayloadType, Route, SensorProduct, TalonError, TalonResult, Telemetry, VehicleAction,
    VehicleEvent, VehicleEventKind, VehiclePhase, VehicleState,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Buffered events per subscriber. A mission holds at most a handful of
/// in-flight waits, so this never fills in practice; a lagging subscriber
/// gets an explicit error from the bridge rather than silent loss.
const EVENT_BUFFER: usize = 256;

struct Command {
    action: VehicleAction,
    ack: oneshot::Sender<TalonResult<()>>,
}

/// Client-side handle to one simulated vehicle.
///
/// Cheap to clone; all clones talk to the same vehicle task. The vehicle
/// task exits when every handle is dropped.
#[derive(Clone, Debug)]
pub struct VehicleHandle {
    id: Uuid,
    cmd_tx: mpsc::Sender<Command>,
    events: broadcast::Sender<VehicleEvent>,
}

impl VehicleHandle {
    /// The vehicle's identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Sends a command and waits for the immediate acknowledgment.
    ///
    /// Fails with [`TalonError::InvalidTransition`] when the action is
    /// illegal from the vehicle's current phase. Acknowledgment is about
    /// acceptance only; flight progress arrives via [`Self::subscribe`].
    pub async fn command(&self, action: VehicleAction) -> TalonResult<()> {
        let (ack, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command { action, ack })
            .await
            .map_err(|_| TalonError::Sim(format!("vehicle {} is gone", self.id)))?;
        rx.await
            .map_err(|_| TalonError::Sim(format!("vehicle {} dropped a command ack", self.id)))?
    }

    /// Subscribes to the vehicle's sequenced event feed.
    ///
    /// The feed is lazy (starts at the current transition count) and
    /// non-restartable; missed history is not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<VehicleEvent> {
        self.events.subscribe()
    }

    /// Subscribes as a [`tokio_stream`] stream, for callers that prefer
    /// stream combinators over an explicit receive loop.
    pub fn subscribe_stream(&self) -> BroadcastStream<VehicleEvent> {
        BroadcastStream::new(self.events.subscribe())
    }
}

/// Factory for simulated vehicles.
pub struct VehicleSimulator;

impl VehicleSimulator {
    /// Spawns a vehicle task governed by `policy` and returns its handle.
    pub fn spawn(policy: SimPolicy) -> VehicleHandle {
        Self::spawn_with_id(Uuid::new_v4(), policy)
    }

    /// Spawns a vehicle with a caller-chosen id (useful in tests and logs).
    pub fn spawn_with_id(id: Uuid, policy: SimPolicy) -> VehicleHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        let rng = match policy.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let vehicle = SimVehicle {
            id,
            phase: VehiclePhase::Ground,
            route: None,
            task_id: None,
            seq: 0,
            deadline: None,
            telemetry: Telemetry::grounded(policy.home),
            policy,
            rng,
            events: events.clone(),
        };

        tokio::spawn(vehicle.run(cmd_rx));
        info!(vehicle_id = %id, "vehicle simulator spawned");

        VehicleHandle { id, cmd_tx, events }
    }
}

/// The vehicle task's private state machine.
struct SimVehicle {
    id: Uuid,
    phase: VehiclePhase,
    route: Option<Route>,
    task_id: Option<Uuid>,
    seq: u64,
    deadline: Option<Instant>,
    telemetry: Telemetry,
    policy: SimPolicy,
    rng: StdRng,
    events: broadcast::Sender<VehicleEvent>,
}

impl SimVehicle {
    async fn run(mut self, mut cmd_rx: mpsc::Receiver<Command>) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                maybe_cmd = cmd_rx.recv() => {
                    match maybe_cmd {
                        Some(cmd) => {
                            let result = self.apply(cmd.action);
                            let _ = cmd.ack.send(result);
                        }
                        None => break,
                    }
                }
                () = tokio::time::sleep_until(
                    deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600))
                ), if deadline.is_some() => {
                    self.advance();
                }
            }
        }
        debug!(vehicle_id = %self.id, "vehicle simulator stopped");
    }

    /// Applies an external command, returning the immediate acknowledgment.
    fn apply(&mut self, action: VehicleAction) -> TalonResult<()> {
        match action {
            VehicleAction::Launch { route, task_id } => {
                if self.phase != VehiclePhase::Ground {
                    return Err(TalonError::InvalidTransition {
                        phase: self.phase,
                        action: "launch".into(),
                    });
                }
                info!(vehicle_id = %self.id, payload = %route.payload, "launch accepted");
                self.route = Some(route);
                self.task_id = Some(task_id);
                self.enter(VehiclePhase::Takeoff);
                Ok(())
            }
            VehicleAction::Abort => {
                info!(vehicle_id = %self.id, phase = %self.phase, "abort: resetting to ground");
                self.route = None;
                self.task_id = None;
                self.deadline = None;
                if self.phase != VehiclePhase::Ground {
                    self.set_phase(VehiclePhase::Ground);
                }
                Ok(())
            }
            VehicleAction::Land => {
                if !self.phase.is_airborne() {
                    return Err(TalonError::InvalidTransition {
                        phase: self.phase,
                        action: "land".into(),
                    });
                }
                // Already heading home: accept without a phantom transition.
                if self.phase != VehiclePhase::Returning {
                    self.enter(VehiclePhase::Returning);
                }
                Ok(())
            }
        }
    }

    /// Fires the current phase's timer: roll for a fault, then move on.
    fn advance(&mut self) {
        let next = match self.phase {
            VehiclePhase::Takeoff => VehiclePhase::EnRoute,
            VehiclePhase::EnRoute => VehiclePhase::OnStation,
            VehiclePhase::OnStation => VehiclePhase::Returning,
            VehiclePhase::Returning => VehiclePhase::Landed,
            VehiclePhase::Landed => VehiclePhase::Ground,
            VehiclePhase::Ground | VehiclePhase::Fault => {
                self.deadline = None;
                return;
            }
        };

        if self.phase.is_airborne() && self.rng.gen::<f64>() < self.policy.fault_probability {
            warn!(vehicle_id = %self.id, phase = %self.phase, "simulated fault");
            self.fault();
            return;
        }

        self.enter(next);
    }

    /// Enters a phase: emits the transition, arms the next timer, and emits
    /// the collected product when coming on station.
    fn enter(&mut self, next: VehiclePhase) {
        self.set_phase(next);

        if self.policy.fail_at == Some(next) {
            warn!(vehicle_id = %self.id, phase = %next, "forced fault");
            self.fault();
            return;
        }

        match next {
            VehiclePhase::Takeoff => self.deadline = Some(Instant::now() + self.policy.takeoff()),
            VehiclePhase::EnRoute => self.deadline = Some(Instant::now() + self.policy.transit()),
            VehiclePhase::OnStation => {
                self.emit_product();
                self.deadline = Some(Instant::now() + self.policy.collection());
            }
            VehiclePhase::Returning => self.deadline = Some(Instant::now() + self.policy.returning()),
            VehiclePhase::Landed => self.deadline = Some(Instant::now()),
            VehiclePhase::Ground => {
                self.route = None;
                self.task_id = None;
                self.deadline = None;
            }
            VehiclePhase::Fault => self.deadline = None,
        }
    }

    fn fault(&mut self) {
        self.set_phase(VehiclePhase::Fault);
        self.deadline = None;
    }

    /// Records the transition and emits exactly one sequenced notification.
    fn set_phase(&mut self, phase: VehiclePhase) {
        debug!(vehicle_id = %self.id, from = %self.phase, to = %phase, "transition");
        self.phase = phase;
        self.telemetry = self.telemetry_for(phase);
        self.seq += 1;
        let state = VehicleState {
            vehicle_id: self.id,
            phase,
            seq: self.seq,
            route_payload: self.route.as_ref().map(|r| r.payload),
            telemetry: self.telemetry,
            at: Utc::now(),
        };
        // No subscribers is fine; the feed is lazy.
        let _ = self.events.send(VehicleEvent {
            seq: self.seq,
            kind: VehicleEventKind::Transition(state),
        });
    }

    /// Fabricates and emits the on-station sensor product for the active
    /// route's payload.
    fn emit_product(&mut self) {
        let (Some(route), Some(task_id)) = (self.route.as_ref(), self.task_id) else {
            return;
        };
        let data = fabricate_data(route);
        let product = SensorProduct::new(route.payload, task_id, data);
        info!(
            vehicle_id = %self.id,
            payload = %route.payload,
            product_id = %product.id,
            "sensor product collected"
        );
        self.seq += 1;
        let _ = self.events.send(VehicleEvent {
            seq: self.seq,
            kind: VehicleEventKind::Product(product),
        });
    }

    fn telemetry_for(&self, phase: VehiclePhase) -> Telemetry {
        let home = self.policy.home;
        let Some(route) = self.route.as_ref() else {
            return Telemetry::grounded(home);
        };
        let first = route.waypoints[0];
        let last = *route.final_waypoint();
        match phase {
            VehiclePhase::Ground | VehiclePhase::Landed => Telemetry::grounded(home),
            VehiclePhase::Takeoff => Telemetry {
                position: home,
                altitude_m: first.altitude_m * 0.3,
                speed_mps: first.speed_mps * 0.5,
            },
            VehiclePhase::EnRoute => Telemetry {
                position: first.position,
                altitude_m: first.altitude_m,
                speed_mps: first.speed_mps,
            },
            VehiclePhase::OnStation => Telemetry {
                position: last.position,
                altitude_m: last.altitude_m,
                speed_mps: last.speed_mps,
            },
            VehiclePhase::Returning => Telemetry {
                position: GeoPoint::new(
                    (last.position.lat + home.lat) / 2.0,
                    (last.position.lon + home.lon) / 2.0,
                ),
                altitude_m: last.altitude_m,
                speed_mps: last.speed_mps,
            },
            // Hold the last known telemetry on a fault.
            VehiclePhase::Fault => self.telemetry,
        }
    }
}

/// Deterministic mock sensor data, shaped like real payload output: SAR
/// yields wide-area hits with scores, EO yields annotated frames at the
/// observation point.
fn fabricate_data(route: &Route) -> serde_json::Value {
    let anchor = route.final_waypoint().position;
    match route.payload {
        PayloadType::Sar => {
            let mut north = f64::MIN;
            let mut south = f64::MAX;
            let mut east = f64::MIN;
            let mut west = f64::MAX;
            for wp in &route.waypoints {
                north = north.max(wp.position.lat);
                south = south.min(wp.position.lat);
                east = east.max(wp.position.lon);
                west = west.min(wp.position.lon);
            }
            serde_json::json!({
                "hits": [
                    { "lat": anchor.lat + 0.0004, "lon": anchor.lon + 0.0002, "score": 0.87 },
                    { "lat": anchor.lat + 0.0226, "lon": anchor.lon + 0.0244, "score": 0.76 },
                ],
                "coverage": { "north": north, "south": south, "east": east, "west": west },
            })
        }
        PayloadType::Eo => serde_json::json!({
            "frames": [
                {
                    "lat": anchor.lat,
                    "lon": anchor.lon,
                    "quality": "high",
                    "annotation": "tracked vehicle under camouflage netting",
                },
            ],
        }),
    }
}
