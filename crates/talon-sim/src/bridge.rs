use std::time::Duration;
use talon_core::{
    SensorProduct, TalonError, TalonResult, VehicleEvent, VehicleEventKind, VehiclePhase,
    VehicleState,
};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// Decouples the simulator's asynchronous notifications from the
/// orchestrator's synchronous step logic.
///
/// The bridge owns one subscription to one vehicle's event feed and exposes
/// wait-for-phase-with-timeout semantics over it. Delivery is at-least-once
/// from the caller's point of view: duplicates are dropped by sequence
/// number, and a lagging subscription (which would mean silently missed
/// transitions) is surfaced as an error instead.
pub struct NotificationBridge {
    vehicle_id: Uuid,
    rx: broadcast::Receiver<VehicleEvent>,
    last_seq: u64,
    /// Last non-fault phase observed; reported when a fault interrupts a wait.
    last_phase: VehiclePhase,
}

impl NotificationBridge {
    /// Wraps a subscription taken from a vehicle handle.
    ///
    /// Subscribe before issuing the command whose effects you want to await;
    /// events emitted before the subscription are not replayed.
    pub fn new(vehicle_id: Uuid, rx: broadcast::Receiver<VehicleEvent>) -> Self {
        Self {
            vehicle_id,
            rx,
            last_seq: 0,
            last_phase: VehiclePhase::Ground,
        }
    }

    /// Receives the next fresh event, deduplicating by sequence number.
    async fn next_event(&mut self) -> TalonResult<VehicleEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if event.seq <= self.last_seq {
                        debug!(
                            vehicle_id = %self.vehicle_id,
                            seq = event.seq,
                            "dropping duplicate notification"
                        );
                        continue;
                    }
                    self.last_seq = event.seq;
                    if let VehicleEventKind::Transition(state) = &event.kind {
                        if state.phase != VehiclePhase::Fault {
                            self.last_phase = state.phase;
                        }
                    }
                    return Ok(event);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    return Err(TalonError::Sim(format!(
                        "notification feed for vehicle {} lagged by {n} events",
                        self.vehicle_id
                    )));
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(TalonError::Sim(format!(
                        "vehicle {} is gone",
                        self.vehicle_id
                    )));
                }
            }
        }
    }

    /// Suspends until the vehicle reaches `target`, faults, or the timeout
    /// elapses.
    ///
    /// Returns the terminal [`VehicleState`] on success, otherwise
    /// [`TalonError::VehicleFault`] or [`TalonError::Timeout`].
    pub async fn await_phase(
        &mut self,
        target: VehiclePhase,
        timeout: Duration,
    ) -> TalonResult<VehicleState> {
        let deadline = Instant::now() + timeout;
        loop {
            let event = tokio::time::timeout_at(deadline, self.next_event())
                .await
                .map_err(|_| TalonError::Timeout(format!("vehicle phase {target}")))??;
            if let VehicleEventKind::Transition(state) = event.kind {
                if state.phase == target {
                    return Ok(state);
                }
                if state.phase == VehiclePhase::Fault {
                    return Err(TalonError::VehicleFault {
                        vehicle_id: self.vehicle_id,
                        phase: self.last_phase,
                    });
                }
            }
        }
    }

    /// Suspends until a sensor product arrives, the vehicle faults, or the
    /// timeout elapses.
    pub async fn await_product(&mut self, timeout: Duration) -> TalonResult<SensorProduct> {
        let deadline = Instant::now() + timeout;
        loop {
            let event = tokio::time::timeout_at(deadline, self.next_event())
                .await
                .map_err(|_| TalonError::Timeout("sensor product".into()))??;
            match event.kind {
                VehicleEventKind::Product(product) => return Ok(product),
                VehicleEventKind::Transition(state) if state.phase == VehiclePhase::Fault => {
                    return Err(TalonError::VehicleFault {
                        vehicle_id: self.vehicle_id,
                        phase: self.last_phase,
                    });
                }
                VehicleEventKind::Transition(_) => {}
            }
        }
    }
}
