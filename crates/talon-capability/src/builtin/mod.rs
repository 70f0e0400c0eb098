//! Deterministic built-in capabilities.
//!
//! These are the simulation-grade stand-ins for the pluggable production
//! capabilities: geometric route planners and threshold-based product
//! processors. They exercise the full capability contract without any
//! learned components, which makes mission runs reproducible.

/// Grid-scan and orbit route planners.
pub mod planners;
/// SAR detection and EO confirmation processors.
pub mod processors;

pub use planners::{GridScanPlanner, OrbitPlanner};
pub use processors::{EoConfirmer, SarDetector};
