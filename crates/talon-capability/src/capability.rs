use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use talon_core::{AreaOfInterest, PayloadType, Route, SensorProduct, TalonResult, TargetUpdate};

/// Metadata describing a capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Unique capability name, e.g. `grid_scan_planner`.
    pub name: String,
    /// What the capability does, for logs and status output.
    pub description: String,
    /// The payload the capability serves.
    pub payload: PayloadType,
}

/// A route-planning capability for one payload type.
///
/// Implementations may be long-running and non-deterministic (the production
/// versions can be model-driven); the orchestrator imposes the deadline and
/// owns retries. Implementations must have no side effects the caller
/// depends on beyond the returned route.
#[async_trait]
pub trait PlanningCapability: Send + Sync {
    /// The capability's metadata.
    fn descriptor(&self) -> &CapabilityDescriptor;

    /// Plans a route over the area of interest.
    ///
    /// Failures are reported as [`talon_core::TalonError::Capability`] with
    /// `retryable` set according to whether a retry could succeed.
    async fn plan(&self, aoi: &AreaOfInterest) -> TalonResult<Route>;
}

/// A sensor-product processing capability for one payload type.
#[async_trait]
pub trait ProcessingCapability: Send + Sync {
    /// The capability's metadata.
    fn descriptor(&self) -> &CapabilityDescriptor;

    /// Processes a product into target updates.
    ///
    /// The orchestrator applies the updates to mission state; the capability
    /// itself holds no state the caller may depend on.
    async fn process(&self, product: &SensorProduct) -> TalonResult<Vec<TargetUpdate>>;
}
