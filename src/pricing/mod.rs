//! Pricing and ROI engine for NeuroExpert service proposals.
//!
//! Computes the multiplier-model ROI, a Monte Carlo spread around it, the
//! recommended service bundle and its price, NPV, IRR and payback. All
//! functions are side-effect free apart from logging.

pub mod calculators;
pub mod models;
pub mod requests;
pub mod responses;
pub mod services;
pub mod simulation;
pub mod tables;

// Re-export commonly used items
pub use calculators::round_money;
pub use models::{BusinessProfile, BusinessSize, EmployeeBand, Industry, RiskTolerance};
pub use requests::CalculateRoiRequest;
pub use responses::{CalculationReport, MonteCarloSummary, RiskFlag, RoiResult, ServiceLineItem};
pub use services::{select_bundle, CalculationOverrides, RoiEngine};
pub use tables::{CoefficientTable, PricingTables, ServiceCatalog, ServiceId};
