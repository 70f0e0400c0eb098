//! Mission workflow orchestration for the Talon framework.
//!
//! The engine drives each mission through its ordered task list — plan →
//! dispatch → collect → process — against the vehicle simulator, applying
//! retry/backoff policy, suspending at human checkpoints, and recording an
//! append-only mission log sufficient to reconstruct history by replay.
//!
//! # Main types
//!
//! - [`MissionEngine`] — Submission, status, checkpoint resolution, abort.
//! - [`Mission`] / [`Task`] — Mission state and its ordered task list.
//! - [`CheckpointGate`] — Parked suspension with exactly-once resolution.
//! - [`MissionLog`] — Append-only JSONL event record.
//! - [`EngineConfig`] / [`RetryPolicy`] — Policy knobs with documented defaults.

/// The mission engine.
pub mod engine;
/// Checkpoint gate and durable checkpoint stores.
pub mod gate;
/// Append-only mission event log.
pub mod log;
/// Retry, checkpoint, and engine configuration.
pub mod policy;
/// Mission, task, and status-report types.
pub mod types;

pub use engine::MissionEngine;
pub use gate::{CheckpointGate, CheckpointStore, FileCheckpointStore, InMemoryCheckpointStore};
pub use log::{EventKind, MissionEvent, MissionLog};
pub use policy::{CheckpointPolicy, CheckpointRule, EngineConfig, RetryPolicy};
pub use types::{Mission, MissionSpec, MissionStatus, StatusReport, Task, TaskPhase, TaskReport};
