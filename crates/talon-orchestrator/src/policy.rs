use serde::{Deserialize, Serialize};
use std::time::Duration;
use talon_core::PayloadType;

/// Exponential-backoff retry policy for capability invocations.
///
/// Only retryable failures (timeouts and capability errors flagged
/// retryable) are retried; permanent failures surface immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt. 3 means up to 4 attempts total.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff before the first retry, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff growth factor between retries.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Ceiling on any single backoff, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            multiplier: default_multiplier(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based), capped at
    /// `max_backoff_ms`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let ms = (self.initial_backoff_ms as f64 * exp).min(self.max_backoff_ms as f64);
        Duration::from_millis(ms as u64)
    }
}

/// Designates where a mission suspends for a human decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "after", rename_all = "snake_case")]
pub enum CheckpointRule {
    /// Suspend once every task flying the given payload is processed, before
    /// the next task is planned.
    Payload {
        /// The payload whose completion triggers the suspension.
        payload: PayloadType,
    },
    /// Suspend after every processed task except the last.
    EveryTask,
}

/// Checkpoint policy carried by a mission submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckpointPolicy {
    /// Decision points. Empty means the mission runs end to end unattended.
    #[serde(default)]
    pub rules: Vec<CheckpointRule>,
    /// Optional decision deadline in seconds. When it elapses the checkpoint
    /// resolves as rejected.
    #[serde(default)]
    pub timeout_s: Option<u64>,
}

impl CheckpointPolicy {
    /// Policy with no decision points.
    pub fn none() -> Self {
        Self::default()
    }

    /// Policy that suspends after the given payload's tasks complete.
    pub fn after_payload(payload: PayloadType) -> Self {
        Self {
            rules: vec![CheckpointRule::Payload { payload }],
            timeout_s: None,
        }
    }

    /// Whether a checkpoint is due after finishing a task with this payload,
    /// given the payload flown next (if any).
    pub fn due_after(&self, finished: PayloadType, next: Option<PayloadType>) -> bool {
        if next.is_none() {
            return false;
        }
        self.rules.iter().any(|rule| match rule {
            CheckpointRule::Payload { payload } => {
                *payload == finished && next != Some(*payload)
            }
            CheckpointRule::EveryTask => true,
        })
    }
}

/// Engine-wide policy knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Retry policy for capability invocations.
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Deadline for a single planner or processor invocation, in seconds.
    #[serde(default = "default_capability_deadline_s")]
    pub capability_deadline_s: u64,
    /// Ceiling on waiting for any one vehicle phase transition, in seconds.
    #[serde(default = "default_phase_wait_s")]
    pub phase_wait_s: u64,
    /// Attempts to acquire a vehicle before giving up on the task.
    #[serde(default = "default_acquire_attempts")]
    pub acquire_attempts: u32,
    /// Pause between vehicle acquisition attempts, in milliseconds.
    #[serde(default = "default_acquire_backoff_ms")]
    pub acquire_backoff_ms: u64,
    /// Radius within which a confirmation matches a known target, in degrees.
    #[serde(default = "default_match_tolerance_deg")]
    pub match_tolerance_deg: f64,
}

fn default_capability_deadline_s() -> u64 {
    30
}

fn default_phase_wait_s() -> u64 {
    60
}

fn default_acquire_attempts() -> u32 {
    5
}

fn default_acquire_backoff_ms() -> u64 {
    200
}

fn default_match_tolerance_deg() -> f64 {
    0.05
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            capability_deadline_s: default_capability_deadline_s(),
            phase_wait_s: default_phase_wait_s(),
            acquire_attempts: default_acquire_attempts(),
            acquire_backoff_ms: default_acquire_backoff_ms(),
            match_tolerance_deg: default_match_tolerance_deg(),
        }
    }
}

impl EngineConfig {
    /// Capability invocation deadline as a [`Duration`].
    pub fn capability_deadline(&self) -> Duration {
        Duration::from_secs(self.capability_deadline_s)
    }

    /// Phase-wait ceiling as a [`Duration`].
    pub fn phase_wait(&self) -> Duration {
        Duration::from_secs(self.phase_wait_s)
    }

    /// Acquisition backoff as a [`Duration`].
    pub fn acquire_backoff(&self) -> Duration {
        Duration::from_millis(self.acquire_backoff_ms)
    }
}
