//! Vehicle simulation for the Talon mission framework.
//!
//! One tokio task per vehicle runs a timed flight state machine and emits
//! sequenced notifications over a broadcast channel. The notification bridge
//! turns that asynchronous stream into the wait-for-phase-with-timeout calls
//! the orchestrator's step logic needs, and the fleet hands out exclusive
//! per-vehicle ownership leases.
//!
//! # Main types
//!
//! - [`VehicleSimulator`] — Spawns a simulated vehicle; returns a [`VehicleHandle`].
//! - [`VehicleHandle`] — Command acknowledgment and event subscription.
//! - [`NotificationBridge`] — `await_phase` / `await_product` with timeout.
//! - [`Fleet`] — Vehicle registry and exclusive [`VehicleLease`] tokens.
//! - [`SimPolicy`] — Phase durations, fault probability, determinism seed.

/// Wait-for-state bridging between the simulator and synchronous step logic.
pub mod bridge;
/// Simulation policy: timings, fault injection, seeding.
pub mod config;
/// Vehicle registry and exclusive ownership leases.
pub mod fleet;
/// The per-vehicle flight state machine.
pub mod vehicle;

pub use bridge::NotificationBridge;
pub use config::SimPolicy;
pub use fleet::{Fleet, VehicleLease};
pub use vehicle::{VehicleHandle, VehicleSimulator};
