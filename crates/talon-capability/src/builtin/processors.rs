use crate::capability::{CapabilityDescriptor, ProcessingCapability};
use async_trait::async_trait;
use talon_core::{
    GeoPoint, PayloadType, SensorProduct, TalonError, TalonResult, TargetUpdate,
};
use tracing::debug;

/// SAR product processor: extracts radar hits above a score threshold as
/// detections.
pub struct SarDetector {
    descriptor: CapabilityDescriptor,
    /// Minimum detector score to report. Hits below it are discarded.
    min_score: f64,
}

impl SarDetector {
    /// Creates a detector with the default 0.8 score threshold.
    pub fn new() -> Self {
        Self::with_threshold(0.8)
    }

    /// Creates a detector with a custom score threshold.
    pub fn with_threshold(min_score: f64) -> Self {
        Self {
            descriptor: CapabilityDescriptor {
                name: "sar_detector".into(),
                description: "threshold detection over SAR hit lists".into(),
                payload: PayloadType::Sar,
            },
            min_score,
        }
    }
}

impl Default for SarDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessingCapability for SarDetector {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn process(&self, product: &SensorProduct) -> TalonResult<Vec<TargetUpdate>> {
        let hits = product
            .data
            .get("hits")
            .and_then(|v| v.as_array())
            .ok_or_else(|| TalonError::Capability {
                message: "SAR product has no 'hits' array".into(),
                retryable: false,
            })?;

        let mut updates = Vec::new();
        for hit in hits {
            let (Some(lat), Some(lon), Some(score)) = (
                hit.get("lat").and_then(|v| v.as_f64()),
                hit.get("lon").and_then(|v| v.as_f64()),
                hit.get("score").and_then(|v| v.as_f64()),
            ) else {
                return Err(TalonError::Capability {
                    message: "malformed SAR hit entry".into(),
                    retryable: false,
                });
            };
            if score < self.min_score {
                debug!(score, min_score = self.min_score, "hit below threshold, discarded");
                continue;
            }
            updates.push(TargetUpdate::Detect {
                position: GeoPoint::new(lat, lon),
                score,
            });
        }
        Ok(updates)
    }
}

/// EO product processor: turns annotated frames into confirmations at the
/// observed position.
pub struct EoConfirmer {
    descriptor: CapabilityDescriptor,
}

impl EoConfirmer {
    /// Creates a confirmer.
    pub fn new() -> Self {
        Self {
            descriptor: CapabilityDescriptor {
                name: "eo_confirmer".into(),
                description: "visual confirmation from annotated EO frames".into(),
                payload: PayloadType::Eo,
            },
        }
    }
}

impl Default for EoConfirmer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessingCapability for EoConfirmer {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn process(&self, product: &SensorProduct) -> TalonResult<Vec<TargetUpdate>> {
        let frames = product
            .data
            .get("frames")
            .and_then(|v| v.as_array())
            .ok_or_else(|| TalonError::Capability {
                message: "EO product has no 'frames' array".into(),
                retryable: false,
            })?;

        let mut updates = Vec::new();
        for frame in frames {
            let (Some(lat), Some(lon)) = (
                frame.get("lat").and_then(|v| v.as_f64()),
                frame.get("lon").and_then(|v| v.as_f64()),
            ) else {
                return Err(TalonError::Capability {
                    message: "malformed EO frame entry".into(),
                    retryable: false,
                });
            };
            let detail = frame
                .get("annotation")
                .and_then(|v| v.as_str())
                .unwrap_or("unannotated observation")
                .to_string();
            updates.push(TargetUpdate::Confirm {
                position: GeoPoint::new(lat, lon),
                detail,
            });
        }
        Ok(updates)
    }
}
