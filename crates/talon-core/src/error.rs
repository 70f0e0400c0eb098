use crate::vehicle::VehiclePhase;
use uuid::Uuid;

/// Top-level error type for the Talon framework.
///
/// Each variant corresponds to an error kind with defined recovery semantics:
/// some are fatal to the call only, some to the task, some to the mission.
#[derive(Debug, thiserror::Error)]
pub enum TalonError {
    /// A vehicle command that is illegal from the current phase. Fatal to the
    /// call, not to the mission.
    #[error("invalid transition: cannot {action} while {phase}")]
    InvalidTransition {
        /// Phase the vehicle was in when the command arrived.
        phase: VehiclePhase,
        /// Human-readable name of the rejected action.
        action: String,
    },

    /// A wait or capability call exceeded its deadline. Retryable at the
    /// orchestrator's discretion per task policy.
    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// The vehicle entered its fault phase while a mission was relying on it.
    #[error("vehicle {vehicle_id} faulted in phase {phase}")]
    VehicleFault {
        /// Identifier of the faulted vehicle.
        vehicle_id: Uuid,
        /// Phase the vehicle was in when the fault occurred.
        phase: VehiclePhase,
    },

    /// A planning or processing capability failed. `retryable` decides whether
    /// the orchestrator may retry with backoff or must fail the task.
    #[error("capability error (retryable: {retryable}): {message}")]
    Capability {
        /// What went wrong, as reported by the capability.
        message: String,
        /// Whether the orchestrator may retry the call.
        retryable: bool,
    },

    /// The requested vehicle is owned by another mission.
    #[error("vehicle {0} is busy")]
    VehicleBusy(Uuid),

    /// A checkpoint was resolved twice. Caller bug; rejected without effect.
    #[error("checkpoint {0} is already resolved")]
    AlreadyResolved(Uuid),

    /// An error in mission bookkeeping (unknown ids, invalid specs).
    #[error("mission error: {0}")]
    Mission(String),

    /// An error in the simulator or notification plumbing.
    #[error("simulator error: {0}")]
    Sim(String),

    /// An error in configuration parsing or validation.
    #[error("config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TalonError {
    /// Whether the orchestrator is allowed to retry the failed operation.
    ///
    /// Only deadline expiries and capability errors explicitly marked
    /// retryable qualify; everything else needs a policy decision.
    pub fn is_retryable(&self) -> bool {
        match self {
            TalonError::Timeout(_) => true,
            TalonError::Capability { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

/// A convenience `Result` alias using [`TalonError`].
pub type TalonResult<T> = Result<T, TalonError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TalonError::Timeout("on_station".into()).is_retryable());
        assert!(TalonError::Capability {
            message: "transient".into(),
            retryable: true
        }
        .is_retryable());
        assert!(!TalonError::Capability {
            message: "bad area".into(),
            retryable: false
        }
        .is_retryable());
        assert!(!TalonError::VehicleBusy(Uuid::new_v4()).is_retryable());
    }

    #[test]
    fn test_display_messages() {
        let err = TalonError::InvalidTransition {
            phase: VehiclePhase::EnRoute,
            action: "launch".into(),
        };
        assert_eq!(err.to_string(), "invalid transition: cannot launch while en_route");

        let err = TalonError::Capability {
            message: "planner crashed".into(),
            retryable: true,
        };
        assert!(err.to_string().contains("retryable"));
    }
}
