//! Pluggable planning and processing capabilities for the Talon framework.
//!
//! Capabilities are the only points where non-deterministic or learned
//! decision-making enters the system; the orchestrator treats them as opaque
//! functions with a typed contract and a declared retryable/non-retryable
//! failure mode. This crate defines the traits, the payload-addressed
//! registry that enforces per-call deadlines, and deterministic built-in
//! capabilities used for simulation runs and tests.
//!
//! # Main types
//!
//! - [`PlanningCapability`] / [`ProcessingCapability`] — The plug-in traits.
//! - [`CapabilityRegistry`] — Payload-addressed lookup and deadline-wrapped invocation.
//! - [`builtin`] — Grid-scan/orbit planners and SAR/EO processors.

/// Deterministic built-in capabilities.
pub mod builtin;
/// The capability traits and descriptors.
pub mod capability;
/// Payload-addressed capability registry.
pub mod registry;

pub use capability::{CapabilityDescriptor, PlanningCapability, ProcessingCapability};
pub use registry::CapabilityRegistry;
