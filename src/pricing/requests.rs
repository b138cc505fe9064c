//! Request DTOs: raw calculator form input.
//!
//! Field names accept both snake_case and the camelCase the web forms post.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, Result};

use super::models::{BusinessProfile, BusinessSize, EmployeeBand, Industry, RiskTolerance};
use super::services::CalculationOverrides;

/// Request to calculate ROI for a business profile
#[derive(Debug, Default, Deserialize)]
pub struct CalculateRoiRequest {
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default, alias = "employeeBand", alias = "employeeCount", alias = "employeeRange")]
    pub employee_band: Option<String>,
    /// Exact head count, used when no band is given
    #[serde(default)]
    pub employees: Option<u32>,
    #[serde(default, alias = "businessSize")]
    pub business_size: Option<String>,
    #[serde(default, alias = "investmentAmount")]
    pub investment: Option<f64>,
    #[serde(default, alias = "annualRevenue", alias = "revenue")]
    pub annual_revenue: Option<f64>,
    #[serde(default, alias = "growthTarget", alias = "growthTargetPercent")]
    pub growth_target_percent: Option<f64>,
    #[serde(default, alias = "timeframe", alias = "timeframeMonths")]
    pub timeframe_months: Option<u32>,
    #[serde(default, alias = "currentOperatingCosts", alias = "currentDigitalSpend")]
    pub current_operating_costs: Option<f64>,
    #[serde(default, alias = "riskTolerance")]
    pub risk_tolerance: Option<String>,
    #[serde(default)]
    pub iterations: Option<usize>,
    #[serde(default, alias = "discountRate")]
    pub discount_rate: Option<f64>,
}

fn default_timeframe() -> u32 {
    12
}

/// Convert a form number, rejecting NaN and infinities
fn to_decimal(field: &str, value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(EngineError::invalid_input(field, format!("must be finite, got {}", value)));
    }
    Decimal::from_f64(value)
        .ok_or_else(|| EngineError::invalid_input(field, format!("{} is out of range", value)))
}

fn required<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| EngineError::invalid_input(field, "is required"))
}

impl CalculateRoiRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate into a typed profile plus per-call overrides
    pub fn into_parts(self) -> Result<(BusinessProfile, CalculationOverrides)> {
        let industry = Industry::from(required("industry", self.industry)?.as_str());

        let employee_band = match (self.employee_band, self.employees) {
            (Some(band), _) => EmployeeBand::from(band.as_str()),
            (None, Some(count)) => EmployeeBand::from_headcount(count),
            (None, None) => return Err(EngineError::invalid_input("employee_band", "is required")),
        };

        let investment = to_decimal("investment", required("investment", self.investment)?)?;

        let profile = BusinessProfile {
            industry,
            employee_band,
            business_size: self
                .business_size
                .as_deref()
                .map(BusinessSize::from)
                .unwrap_or_default(),
            investment,
            annual_revenue: self
                .annual_revenue
                .map(|v| to_decimal("annual_revenue", v))
                .transpose()?,
            growth_target_percent: self
                .growth_target_percent
                .map(|v| to_decimal("growth_target_percent", v))
                .transpose()?
                .unwrap_or(Decimal::ZERO),
            timeframe_months: self.timeframe_months.unwrap_or_else(default_timeframe),
            current_operating_costs: self
                .current_operating_costs
                .map(|v| to_decimal("current_operating_costs", v))
                .transpose()?,
            risk_tolerance: self
                .risk_tolerance
                .as_deref()
                .map(RiskTolerance::from)
                .unwrap_or_default(),
        };
        profile.validate()?;

        let overrides = CalculationOverrides {
            iterations: self.iterations,
            discount_rate: self
                .discount_rate
                .map(|v| to_decimal("discount_rate", v))
                .transpose()?,
        };

        Ok((profile, overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_camel_case_form_payload() {
        let request = CalculateRoiRequest::from_json(
            r#"{
                "industry": "it",
                "employeeCount": "from11to50",
                "businessSize": "large",
                "investment": 500000,
                "revenue": 50000000,
                "growthTarget": 35,
                "timeframe": 24,
                "riskTolerance": "aggressive",
                "discountRate": 0.08
            }"#,
        )
        .unwrap();
        let (profile, overrides) = request.into_parts().unwrap();

        assert_eq!(profile.industry, Industry::It);
        assert_eq!(profile.employee_band, EmployeeBand::Medium);
        assert_eq!(profile.business_size, BusinessSize::Large);
        assert_eq!(profile.investment, dec!(500000));
        assert_eq!(profile.annual_revenue, Some(dec!(50000000)));
        assert_eq!(profile.growth_target_percent, dec!(35));
        assert_eq!(profile.timeframe_months, 24);
        assert_eq!(profile.risk_tolerance, RiskTolerance::Aggressive);
        assert_eq!(overrides.discount_rate, Some(dec!(0.08)));
        assert_eq!(overrides.iterations, None);
    }

    #[test]
    fn test_snake_case_payload_with_headcount() {
        let request = CalculateRoiRequest::from_json(
            r#"{"industry": "retail", "employees": 120, "investment": 250000}"#,
        )
        .unwrap();
        let (profile, _) = request.into_parts().unwrap();
        assert_eq!(profile.employee_band, EmployeeBand::Large);
        assert_eq!(profile.business_size, BusinessSize::Small);
        assert_eq!(profile.timeframe_months, 12);
        assert_eq!(profile.growth_target_percent, dec!(0));
    }

    #[test]
    fn test_unknown_tokens_are_not_errors() {
        let request = CalculateRoiRequest::from_json(
            r#"{"industry": "space", "employee_band": "galactic", "investment": 1000}"#,
        )
        .unwrap();
        let (profile, _) = request.into_parts().unwrap();
        assert_eq!(profile.industry, Industry::Unknown);
        assert_eq!(profile.employee_band, EmployeeBand::Unknown);
    }

    #[test]
    fn test_missing_fields_are_invalid_input() {
        let err = CalculateRoiRequest::from_json(r#"{"employees": 5, "investment": 1000}"#)
            .unwrap()
            .into_parts()
            .unwrap_err();
        assert!(err.to_string().contains("industry"));

        let err = CalculateRoiRequest::from_json(r#"{"industry": "it", "investment": 1000}"#)
            .unwrap()
            .into_parts()
            .unwrap_err();
        assert!(err.to_string().contains("employee_band"));

        let err = CalculateRoiRequest::from_json(r#"{"industry": "it", "employees": 5}"#)
            .unwrap()
            .into_parts()
            .unwrap_err();
        assert!(err.to_string().contains("investment"));
    }

    #[test]
    fn test_zero_investment_rejected() {
        let err = CalculateRoiRequest::from_json(
            r#"{"industry": "it", "employees": 5, "investment": 0}"#,
        )
        .unwrap()
        .into_parts()
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_non_finite_investment_rejected() {
        let request = CalculateRoiRequest {
            industry: Some("it".to_string()),
            employees: Some(5),
            investment: Some(f64::NAN),
            ..CalculateRoiRequest::default()
        };
        let err = request.into_parts().unwrap_err();
        assert!(err.to_string().contains("must be finite"));

        let request = CalculateRoiRequest {
            industry: Some("it".to_string()),
            employees: Some(5),
            investment: Some(1000.0),
            annual_revenue: Some(f64::INFINITY),
            ..CalculateRoiRequest::default()
        };
        assert!(request.into_parts().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = CalculateRoiRequest::from_json("{\"industry\": ").unwrap_err();
        assert_eq!(err.error_type(), "malformed_json");
    }
}
