//! Engine configuration loaded from the environment.
//!
//! | Variable             | Default  |
//! |----------------------|----------|
//! | `ROI_ITERATIONS`     | 10000    |
//! | `ROI_DISCOUNT_RATE`  | 0.10     |
//! | `ROI_SEED`           | (random) |
//! | `ROI_BENEFIT_GROWTH` | 0.05     |
//! | `ROI_SAVINGS_RATE`   | 0.15     |
//! | `ROI_CURRENCY`       | RUB      |
//! | `ROI_TABLES_PATH`    | (built-in tables) |

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{EngineError, Result};
use crate::pricing::simulation::DEFAULT_ITERATIONS;
use crate::pricing::tables::PricingTables;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub iterations: usize,
    pub discount_rate: Decimal,
    /// Fixed seed for reproducible simulations
    pub seed: Option<u64>,
    /// Year-over-year growth of the annual benefit in the cash flows
    pub benefit_growth_rate: Decimal,
    /// Share of operating costs (or revenue) saved per year
    pub savings_rate: Decimal,
    pub currency: String,
    pub tables_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            discount_rate: dec!(0.10),
            seed: None,
            benefit_growth_rate: dec!(0.05),
            savings_rate: dec!(0.15),
            currency: "RUB".to_string(),
            tables_path: None,
        }
    }
}

impl EngineConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            iterations: parse_var(&lookup, "ROI_ITERATIONS")?.unwrap_or(defaults.iterations),
            discount_rate: parse_var(&lookup, "ROI_DISCOUNT_RATE")?
                .unwrap_or(defaults.discount_rate),
            seed: parse_var(&lookup, "ROI_SEED")?,
            benefit_growth_rate: parse_var(&lookup, "ROI_BENEFIT_GROWTH")?
                .unwrap_or(defaults.benefit_growth_rate),
            savings_rate: parse_var(&lookup, "ROI_SAVINGS_RATE")?
                .unwrap_or(defaults.savings_rate),
            currency: lookup("ROI_CURRENCY")
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.currency),
            tables_path: lookup("ROI_TABLES_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.iterations == 0 {
            errors.push("iterations: must be at least 1".to_string());
        }
        if self.discount_rate <= dec!(-1) {
            errors.push(format!(
                "discount_rate: must be greater than -1, got {}",
                self.discount_rate
            ));
        }
        if self.benefit_growth_rate <= dec!(-1) {
            errors.push(format!(
                "benefit_growth_rate: must be greater than -1, got {}",
                self.benefit_growth_rate
            ));
        }
        if self.savings_rate < Decimal::ZERO || self.savings_rate > Decimal::ONE {
            errors.push(format!(
                "savings_rate: must be in [0, 1], got {}",
                self.savings_rate
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::configuration("Invalid engine configuration", errors))
        }
    }

    /// Tables from `tables_path`, or the built-in set
    pub fn load_tables(&self) -> Result<PricingTables> {
        match &self.tables_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    EngineError::configuration(
                        format!("Cannot read pricing tables from {}", path.display()),
                        vec![e.to_string()],
                    )
                })?;
                tracing::info!("Loaded pricing tables from {}", path.display());
                PricingTables::from_json(&json)
            }
            None => Ok(PricingTables::default()),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map(Some).map_err(|e| {
            EngineError::configuration(
                format!("{} has an invalid value '{}'", key, raw),
                vec![e.to_string()],
            )
        }),
        _ => Ok(None),
    }
}
