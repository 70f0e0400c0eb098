use crate::capability::{PlanningCapability, ProcessingCapability};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use talon_core::{
    AreaOfInterest, PayloadType, Route, SensorProduct, TalonError, TalonResult, TargetUpdate,
};
use tracing::{info, warn};

/// Central registry of planning and processing capabilities, addressed by
/// payload type.
///
/// Invocation is synchronous from the orchestrator's perspective but
/// deadline-bounded: a capability that neither returns nor fails within the
/// caller-supplied deadline yields [`TalonError::Timeout`].
pub struct CapabilityRegistry {
    planners: HashMap<PayloadType, Arc<dyn PlanningCapability>>,
    processors: HashMap<PayloadType, Arc<dyn ProcessingCapability>>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            planners: HashMap::new(),
            processors: HashMap::new(),
        }
    }

    /// Registers a planner for its payload type, replacing any previous one.
    pub fn register_planner(&mut self, planner: Arc<dyn PlanningCapability>) {
        let descriptor = planner.descriptor();
        info!(name = %descriptor.name, payload = %descriptor.payload, "registered planner");
        self.planners.insert(descriptor.payload, planner);
    }

    /// Registers a processor for its payload type, replacing any previous one.
    pub fn register_processor(&mut self, processor: Arc<dyn ProcessingCapability>) {
        let descriptor = processor.descriptor();
        info!(name = %descriptor.name, payload = %descriptor.payload, "registered processor");
        self.processors.insert(descriptor.payload, processor);
    }

    /// Plans a route with the payload's registered planner, bounded by
    /// `deadline`.
    pub async fn plan(
        &self,
        payload: PayloadType,
        aoi: &AreaOfInterest,
        deadline: Duration,
    ) -> TalonResult<Route> {
        let planner = self
            .planners
            .get(&payload)
            .ok_or_else(|| TalonError::Capability {
                message: format!("no planner registered for payload {payload}"),
                retryable: false,
            })?;
        match tokio::time::timeout(deadline, planner.plan(aoi)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(payload = %payload, "planner missed its deadline");
                Err(TalonError::Timeout(format!("{payload} planner")))
            }
        }
    }

    /// Processes a product with the payload's registered processor, bounded
    /// by `deadline`.
    pub async fn process(
        &self,
        payload: PayloadType,
        product: &SensorProduct,
        deadline: Duration,
    ) -> TalonResult<Vec<TargetUpdate>> {
        let processor = self
            .processors
            .get(&payload)
            .ok_or_else(|| TalonError::Capability {
                message: format!("no processor registered for payload {payload}"),
                retryable: false,
            })?;
        match tokio::time::timeout(deadline, processor.process(product)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(payload = %payload, "processor missed its deadline");
                Err(TalonError::Timeout(format!("{payload} processor")))
            }
        }
    }

    /// Whether both a planner and a processor exist for the payload.
    pub fn covers(&self, payload: PayloadType) -> bool {
        self.planners.contains_key(&payload) && self.processors.contains_key(&payload)
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::capability::CapabilityDescriptor;
    use async_trait::async_trait;
    use talon_core::Area;

    struct StalledPlanner {
        descriptor: CapabilityDescriptor,
    }

    #[async_trait]
    impl PlanningCapability for StalledPlanner {
        fn descriptor(&self) -> &CapabilityDescriptor {
            &self.descriptor
        }

        async fn plan(&self, _aoi: &AreaOfInterest) -> TalonResult<Route> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("the registry deadline fires first")
        }
    }

    #[tokio::test]
    async fn test_missing_planner_is_permanent_failure() {
        let registry = CapabilityRegistry::new();
        let aoi = AreaOfInterest::whole(Area::from_bounds(35.2, 35.0, 117.7, 117.4));
        let err = registry
            .plan(PayloadType::Sar, &aoi, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TalonError::Capability { retryable: false, .. }));
    }

    #[tokio::test]
    async fn test_deadline_enforced() {
        let mut registry = CapabilityRegistry::new();
        registry.register_planner(Arc::new(StalledPlanner {
            descriptor: CapabilityDescriptor {
                name: "stalled".into(),
                description: "never returns".into(),
                payload: PayloadType::Sar,
            },
        }));

        let aoi = AreaOfInterest::whole(Area::from_bounds(35.2, 35.0, 117.7, 117.4));
        let err = registry
            .plan(PayloadType::Sar, &aoi, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, TalonError::Timeout(_)));
        assert!(err.is_retryable());
    }
}
