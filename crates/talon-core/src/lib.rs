//! Core types and error definitions for the Talon mission framework.
//!
//! This crate provides the foundational types shared across all Talon crates:
//! geographic primitives, the payload/route/product/target data model, the
//! vehicle state model, checkpoint types, and the unified error enum.
//!
//! # Main types
//!
//! - [`TalonError`] — Unified error enum for all Talon subsystems.
//! - [`TalonResult`] — Convenience alias for `Result<T, TalonError>`.
//! - [`PayloadType`] — Sensor payload kind (SAR or EO).
//! - [`Route`] — An immutable planned flight route.
//! - [`SensorProduct`] — Opaque sensor output tied to its producing task.
//! - [`Target`] — A detected or confirmed reconnaissance target.
//! - [`VehicleState`] / [`VehicleEvent`] — Sequenced vehicle notifications.
//! - [`Checkpoint`] / [`Resolution`] — Human-decision suspension records.

/// Checkpoint and resolution types for human-in-the-loop mission gates.
pub mod checkpoint;
/// Unified error enum and result alias.
pub mod error;
/// Geographic primitives: points, areas, waypoints.
pub mod geo;
/// Payloads, routes, sensor products, and targets.
pub mod mission;
/// Vehicle phases, actions, and sequenced state notifications.
pub mod vehicle;

pub use checkpoint::{Checkpoint, CheckpointStatus, Resolution, TaskAdjustment};
pub use error::{TalonError, TalonResult};
pub use geo::{Area, GeoPoint, Waypoint};
pub use mission::{
    AreaOfInterest, PayloadType, Route, SensorProduct, Target, TargetConfidence, TargetUpdate,
};
pub use vehicle::{Telemetry, VehicleAction, VehicleEvent, VehicleEventKind, VehiclePhase, VehicleState};
