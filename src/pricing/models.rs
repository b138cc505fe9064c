//! Domain models for ROI calculations.
//!
//! Enum parsing is lenient: unrecognised tokens map to an `Unknown` variant
//! (or a documented default) so that coefficient lookup can fall back instead
//! of failing. Deserialization goes through the same `From<&str>` parsing.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Largest investment, revenue or cost figure a profile may carry
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);
/// Longest planning horizon, 50 years
pub const MAX_TIMEFRAME_MONTHS: u32 = 600;

/// Industry the customer operates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Industry {
    Retail,
    Production,
    It,
    Finance,
    Construction,
    Medicine,
    Logistics,
    Services,
    Other,
    /// Token not present in the form vocabulary
    Unknown,
}

impl Industry {
    pub const ALL: [Industry; 9] = [
        Industry::Retail,
        Industry::Production,
        Industry::It,
        Industry::Finance,
        Industry::Construction,
        Industry::Medicine,
        Industry::Logistics,
        Industry::Services,
        Industry::Other,
    ];
}

impl From<&str> for Industry {
    fn from(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "retail" => Industry::Retail,
            "production" | "manufacturing" => Industry::Production,
            "it" | "it_telecom" => Industry::It,
            "finance" => Industry::Finance,
            "construction" => Industry::Construction,
            "medicine" | "healthcare" => Industry::Medicine,
            "logistics" => Industry::Logistics,
            "services" => Industry::Services,
            "other" => Industry::Other,
            _ => Industry::Unknown,
        }
    }
}

impl From<String> for Industry {
    fn from(token: String) -> Self {
        Self::from(token.as_str())
    }
}

/// Employee head-count band, drives the scale multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum EmployeeBand {
    /// Up to 10 employees
    Small,
    /// 11 to 50 employees
    Medium,
    /// 51 to 250 employees
    Large,
    /// More than 250 employees
    Xlarge,
    Unknown,
}

impl EmployeeBand {
    pub const ALL: [EmployeeBand; 4] = [
        EmployeeBand::Small,
        EmployeeBand::Medium,
        EmployeeBand::Large,
        EmployeeBand::Xlarge,
    ];

    /// Band for an exact head count
    pub fn from_headcount(employees: u32) -> Self {
        match employees {
            0 => EmployeeBand::Unknown,
            1..=10 => EmployeeBand::Small,
            11..=50 => EmployeeBand::Medium,
            51..=250 => EmployeeBand::Large,
            _ => EmployeeBand::Xlarge,
        }
    }
}

impl From<&str> for EmployeeBand {
    fn from(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "small" | "up10" => EmployeeBand::Small,
            "medium" | "from11to50" => EmployeeBand::Medium,
            "large" | "from51to250" => EmployeeBand::Large,
            "xlarge" | "over250" => EmployeeBand::Xlarge,
            _ => EmployeeBand::Unknown,
        }
    }
}

impl From<String> for EmployeeBand {
    fn from(token: String) -> Self {
        Self::from(token.as_str())
    }
}

/// Coarse company size used by the bundle rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum BusinessSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl From<&str> for BusinessSize {
    /// Unrecognised sizes default to `Small`
    fn from(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "medium" => BusinessSize::Medium,
            "large" => BusinessSize::Large,
            _ => BusinessSize::Small,
        }
    }
}

impl From<String> for BusinessSize {
    fn from(token: String) -> Self {
        Self::from(token.as_str())
    }
}

/// Customer appetite for risk, applied as a haircut on the base ROI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum RiskTolerance {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    pub fn factor(self) -> Decimal {
        match self {
            RiskTolerance::Conservative => Decimal::new(7, 1),
            RiskTolerance::Moderate => Decimal::new(8, 1),
            RiskTolerance::Aggressive => Decimal::new(9, 1),
        }
    }
}

impl From<&str> for RiskTolerance {
    /// Unrecognised tolerances default to `Moderate`
    fn from(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "conservative" | "low" => RiskTolerance::Conservative,
            "aggressive" | "high" => RiskTolerance::Aggressive,
            _ => RiskTolerance::Moderate,
        }
    }
}

impl From<String> for RiskTolerance {
    fn from(token: String) -> Self {
        Self::from(token.as_str())
    }
}

/// Validated business profile, the engine's only input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub industry: Industry,
    pub employee_band: EmployeeBand,
    pub business_size: BusinessSize,
    #[serde(with = "rust_decimal::serde::str")]
    pub investment: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub annual_revenue: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str")]
    pub growth_target_percent: Decimal,
    pub timeframe_months: u32,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub current_operating_costs: Option<Decimal>,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
}

impl BusinessProfile {
    /// Profile with only the fields the multiplier model needs.
    ///
    /// Defaults: no revenue, 0% growth target, 12 month timeframe.
    pub fn new(
        industry: Industry,
        employee_band: EmployeeBand,
        business_size: BusinessSize,
        investment: Decimal,
    ) -> Self {
        Self {
            industry,
            employee_band,
            business_size,
            investment,
            annual_revenue: None,
            growth_target_percent: Decimal::ZERO,
            timeframe_months: 12,
            current_operating_costs: None,
            risk_tolerance: RiskTolerance::default(),
        }
    }

    pub fn with_revenue(mut self, annual_revenue: Decimal) -> Self {
        self.annual_revenue = Some(annual_revenue);
        self
    }

    pub fn with_growth_target(mut self, percent: Decimal) -> Self {
        self.growth_target_percent = percent;
        self
    }

    pub fn with_timeframe(mut self, months: u32) -> Self {
        self.timeframe_months = months;
        self
    }

    pub fn with_operating_costs(mut self, costs: Decimal) -> Self {
        self.current_operating_costs = Some(costs);
        self
    }

    pub fn with_risk_tolerance(mut self, tolerance: RiskTolerance) -> Self {
        self.risk_tolerance = tolerance;
        self
    }

    /// Check the invariants every calculation relies on.
    pub fn validate(&self) -> Result<()> {
        if self.investment <= Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "investment",
                format!("must be greater than zero, got {}", self.investment),
            ));
        }
        check_ceiling("investment", self.investment)?;
        if let Some(revenue) = self.annual_revenue {
            if revenue <= Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    "annual_revenue",
                    format!("must be greater than zero when provided, got {}", revenue),
                ));
            }
            check_ceiling("annual_revenue", revenue)?;
        }
        if self.growth_target_percent < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "growth_target_percent",
                format!("must not be negative, got {}", self.growth_target_percent),
            ));
        }
        if self.timeframe_months == 0 {
            return Err(EngineError::invalid_input(
                "timeframe_months",
                "must be a positive number of months",
            ));
        }
        if self.timeframe_months > MAX_TIMEFRAME_MONTHS {
            return Err(EngineError::invalid_input(
                "timeframe_months",
                format!(
                    "must be at most {} months, got {}",
                    MAX_TIMEFRAME_MONTHS, self.timeframe_months
                ),
            ));
        }
        if let Some(costs) = self.current_operating_costs {
            if costs < Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    "current_operating_costs",
                    format!("must not be negative, got {}", costs),
                ));
            }
            check_ceiling("current_operating_costs", costs)?;
        }
        Ok(())
    }
}

fn check_ceiling(field: &str, amount: Decimal) -> Result<()> {
    if amount > MAX_AMOUNT {
        return Err(EngineError::invalid_input(
            field,
            format!("must be at most {}, got {}", MAX_AMOUNT, amount),
        ));
    }
    Ok(())
}
