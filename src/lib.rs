//! NeuroExpert ROI calculation engine.

pub mod config;
pub mod error;
pub mod pricing;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use pricing::{BusinessProfile, CalculationOverrides, RoiEngine, RoiResult};
