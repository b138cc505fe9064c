//! Result DTOs produced by the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::models::BusinessProfile;
use super::tables::ServiceId;

/// Money value for JSON responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
        }
    }
}

/// One priced service in a recommended bundle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceLineItem {
    pub id: ServiceId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub cost: Decimal,
}

/// Output of bundle selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleResult {
    pub items: Vec<ServiceLineItem>,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    pub discount_applied: bool,
    /// Rounded to whole currency units
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
}

/// Distribution of simulated ROI percents
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonteCarloSummary {
    pub mean: f64,
    pub median: f64,
    pub p5: f64,
    pub p95: f64,
    pub std_dev: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearProjection {
    pub year: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub profit: Decimal,
}

/// Profile traits that make the projected return less certain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    SmallTeam,
    LowRevenue,
    LongPayback,
}

/// Full calculation result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiResult {
    pub base_roi: i64,
    pub optimistic_roi: i64,
    pub pessimistic_roi: i64,
    pub risk_adjusted_roi: i64,
    pub profit: MoneyResponse,
    pub savings: MoneyResponse,
    pub growth: MoneyResponse,
    pub annual_benefit: MoneyResponse,
    /// `None` when the annual benefit is not positive
    pub payback_months: Option<u32>,
    pub npv: MoneyResponse,
    pub irr: i64,
    pub irr_converged: bool,
    pub break_even_point: Option<u32>,
    pub recommended_price: MoneyResponse,
    pub service_bundle: Vec<ServiceLineItem>,
    pub discount_applied: bool,
    pub monte_carlo: MonteCarloSummary,
    pub projection: Vec<YearProjection>,
    pub risk_flags: Vec<RiskFlag>,
}

/// Envelope handed to downstream consumers (UI, PDF export)
#[derive(Debug, Clone, Serialize)]
pub struct CalculationReport {
    pub id: Uuid,
    pub calculated_at: DateTime<Utc>,
    pub profile: BusinessProfile,
    pub result: RoiResult,
}

/// Error body for JSON consumers
#[derive(Debug, Serialize)]
pub struct EngineErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl From<&crate::error::EngineError> for EngineErrorResponse {
    fn from(err: &crate::error::EngineError) -> Self {
        let details = match err {
            crate::error::EngineError::Configuration { errors, .. } => errors.clone(),
            _ => Vec::new(),
        };
        Self {
            error_type: err.error_type().to_string(),
            message: err.to_string(),
            details,
        }
    }
}
