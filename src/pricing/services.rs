//! Bundle pricing and the ROI engine.
//!
//! `RoiEngine` owns the injected tables and configuration; every calculation
//! is a pure function of those plus the profile and the random source.

use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

use super::calculators::{
    build_cash_flows, compute_irr, compute_npv, compute_profit, months_to_recover, overflowed,
    periods_for_timeframe, project_years, roi_ratio_percent, round_money, round_percent,
};
use super::models::{BusinessProfile, BusinessSize, EmployeeBand, Industry};
use super::responses::{
    BundleResult, CalculationReport, MoneyResponse, RiskFlag, RoiResult, ServiceLineItem,
};
use super::simulation::simulate;
use super::tables::{PricingTables, ServiceCatalog, ServiceId, ServiceItem};

const DESIGN_GROWTH_THRESHOLD: Decimal = dec!(20);
const AI_GROWTH_THRESHOLD: Decimal = dec!(30);
const LOW_REVENUE_THRESHOLD: Decimal = dec!(5000000);
const LONG_PAYBACK_MONTHS: u32 = 6;

/// Select the recommended services for a profile and price the bundle.
///
/// Rules are cumulative and applied in order:
/// 1. audit, always
/// 2. strategy for medium and large businesses
/// 3. UX/UI design plus platform development when the growth target is over 20%
/// 4. AI integration for IT and services, or a growth target over 30%
/// 5. support, always, priced at its range minimum
///
/// Every other item is priced at its range midpoint. The catalog discount
/// applies once the bundle reaches the catalog's item threshold.
pub fn select_bundle(profile: &BusinessProfile, catalog: &ServiceCatalog) -> Result<BundleResult> {
    let mut items = Vec::new();
    let mut push_midpoint = |item: &ServiceItem| {
        items.push(ServiceLineItem {
            id: item.id,
            name: item.name.clone(),
            cost: item.effective_price(),
        });
    };

    push_midpoint(catalog.item(ServiceId::Audit)?);

    if matches!(profile.business_size, BusinessSize::Medium | BusinessSize::Large) {
        push_midpoint(catalog.item(ServiceId::Strategy)?);
    }

    if profile.growth_target_percent > DESIGN_GROWTH_THRESHOLD {
        push_midpoint(catalog.item(ServiceId::Design)?);
        push_midpoint(catalog.item(ServiceId::Development)?);
    }

    if matches!(profile.industry, Industry::It | Industry::Services)
        || profile.growth_target_percent > AI_GROWTH_THRESHOLD
    {
        push_midpoint(catalog.item(ServiceId::AiIntegration)?);
    }

    let support = catalog.item(ServiceId::Support)?;
    items.push(ServiceLineItem {
        id: support.id,
        name: support.name.clone(),
        cost: support.price_range.min,
    });

    let subtotal: Decimal = items.iter().map(|item| item.cost).sum();
    let discount_applied = items.len() >= catalog.discount_threshold;
    let discounted = if discount_applied {
        subtotal * (Decimal::ONE - catalog.bundle_discount)
    } else {
        subtotal
    };

    tracing::debug!(
        items = items.len(),
        %subtotal,
        discount_applied,
        "Bundle selected"
    );

    Ok(BundleResult {
        items,
        subtotal,
        discount_applied,
        total_price: round_money(discounted, 0),
    })
}

/// Flag the profile traits that weaken the projection.
///
/// A team of ten or fewer, revenue under 5M and a payback longer than six
/// months (or none at all) are each flagged. Missing revenue is not flagged.
pub fn risk_flags(profile: &BusinessProfile, payback_months: Option<u32>) -> Vec<RiskFlag> {
    let mut flags = Vec::new();
    if profile.employee_band == EmployeeBand::Small {
        flags.push(RiskFlag::SmallTeam);
    }
    if matches!(profile.annual_revenue, Some(revenue) if revenue < LOW_REVENUE_THRESHOLD) {
        flags.push(RiskFlag::LowRevenue);
    }
    if payback_months.map_or(true, |months| months > LONG_PAYBACK_MONTHS) {
        flags.push(RiskFlag::LongPayback);
    }
    flags
}

/// Per-call overrides of the engine configuration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalculationOverrides {
    pub iterations: Option<usize>,
    pub discount_rate: Option<Decimal>,
}

/// Savings, growth and the annual benefit they add up to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenefitBreakdown {
    pub savings: Decimal,
    pub growth: Decimal,
    pub annual_benefit: Decimal,
}

/// Calculation engine with injected tables and configuration
#[derive(Debug, Clone)]
pub struct RoiEngine {
    tables: PricingTables,
    config: EngineConfig,
}

impl RoiEngine {
    pub fn new(config: EngineConfig, tables: PricingTables) -> Result<Self> {
        config.validate()?;
        tables.validate()?;
        Ok(Self { tables, config })
    }

    /// Engine using the tables named by the configuration
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let tables = config.load_tables()?;
        Self::new(config, tables)
    }

    pub fn tables(&self) -> &PricingTables {
        &self.tables
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a calculation, seeding the simulation from the configuration
    pub fn calculate(
        &self,
        profile: &BusinessProfile,
        overrides: &CalculationOverrides,
    ) -> Result<RoiResult> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.calculate_with_rng(profile, overrides, &mut rng)
    }

    /// Wait for `delay`, then calculate. The delay only paces the caller's
    /// loading state; the result is identical to [`RoiEngine::calculate`].
    pub async fn calculate_with_delay(
        &self,
        profile: &BusinessProfile,
        overrides: &CalculationOverrides,
        delay: Duration,
    ) -> Result<RoiResult> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.calculate(profile, overrides)
    }

    /// Run a calculation with an explicit random source
    pub fn calculate_with_rng<R: Rng + ?Sized>(
        &self,
        profile: &BusinessProfile,
        overrides: &CalculationOverrides,
        rng: &mut R,
    ) -> Result<RoiResult> {
        profile.validate()?;

        let iterations = overrides.iterations.unwrap_or(self.config.iterations);
        if iterations == 0 {
            return Err(EngineError::invalid_input(
                "iterations",
                "must be a positive number of trials",
            ));
        }
        let discount_rate = overrides.discount_rate.unwrap_or(self.config.discount_rate);
        if discount_rate <= dec!(-1) {
            return Err(EngineError::invalid_input(
                "discount_rate",
                format!("must be greater than -1, got {}", discount_rate),
            ));
        }

        let currency = self.config.currency.as_str();
        let coefficients = &self.tables.coefficients;
        let industry_coef = coefficients.resolve_industry(profile.industry);
        let scale_coef = coefficients.resolve_scale(profile.employee_band);
        tracing::debug!(%industry_coef, %scale_coef, "Resolved coefficients");

        let profit = compute_profit(profile.investment, industry_coef, scale_coef)?;
        let roi_exact = roi_ratio_percent(profit, profile.investment)?;
        let base_roi = round_percent(roi_exact)?;
        let risk_adjusted_roi = round_percent(roi_exact * profile.risk_tolerance.factor())?;

        let roi_for_simulation = roi_exact.to_f64().ok_or_else(|| {
            EngineError::invalid_input("base_roi", format!("{} is not representable", roi_exact))
        })?;
        let monte_carlo = simulate(roi_for_simulation, iterations, rng)?;

        let bundle = select_bundle(profile, &self.tables.catalog)?;
        let price = bundle.total_price;

        let benefit = self.benefit_breakdown(profile, profit)?;
        let payback_months = months_to_recover(price, benefit.annual_benefit);
        let break_even_point = months_to_recover(price, benefit.annual_benefit);

        let cash_flows = build_cash_flows(
            price,
            benefit.annual_benefit,
            periods_for_timeframe(profile.timeframe_months),
            self.config.benefit_growth_rate,
        )?;
        let npv = compute_npv(&cash_flows, discount_rate)?;
        let irr = compute_irr(&cash_flows);
        if !irr.converged {
            tracing::warn!(
                rate = %irr.rate,
                iterations = irr.iterations,
                "IRR search did not converge, reporting best effort"
            );
        }

        let result = RoiResult {
            base_roi,
            optimistic_roi: monte_carlo.p95.round() as i64,
            pessimistic_roi: monte_carlo.p5.round() as i64,
            risk_adjusted_roi,
            profit: MoneyResponse::new(round_money(profit, 0), currency),
            savings: MoneyResponse::new(round_money(benefit.savings, 0), currency),
            growth: MoneyResponse::new(round_money(benefit.growth, 0), currency),
            annual_benefit: MoneyResponse::new(round_money(benefit.annual_benefit, 0), currency),
            payback_months,
            npv: MoneyResponse::new(round_money(npv, 0), currency),
            irr: round_percent(irr.rate * Decimal::ONE_HUNDRED)?,
            irr_converged: irr.converged,
            break_even_point,
            recommended_price: MoneyResponse::new(price, currency),
            service_bundle: bundle.items,
            discount_applied: bundle.discount_applied,
            monte_carlo,
            projection: project_years(benefit.annual_benefit, price)?,
            risk_flags: risk_flags(profile, payback_months),
        };

        tracing::info!(
            industry = ?profile.industry,
            base_roi = result.base_roi,
            price = %price,
            payback_months = ?result.payback_months,
            "ROI calculation complete"
        );

        Ok(result)
    }

    /// Annual benefit of the engagement.
    ///
    /// Savings apply to operating costs when known, otherwise to revenue.
    /// Growth is the revenue growth target. Without either figure the
    /// multiplier-model profit is spread over the timeframe instead.
    pub fn benefit_breakdown(
        &self,
        profile: &BusinessProfile,
        profit: Decimal,
    ) -> Result<BenefitBreakdown> {
        let savings_base = profile.current_operating_costs.or(profile.annual_revenue);
        let savings = match savings_base {
            Some(base) => base
                .checked_mul(self.config.savings_rate)
                .ok_or_else(|| overflowed("savings"))?,
            None => Decimal::ZERO,
        };
        let growth = match profile.annual_revenue {
            Some(revenue) => revenue
                .checked_mul(profile.growth_target_percent)
                .ok_or_else(|| overflowed("growth_target_percent"))?
                / Decimal::ONE_HUNDRED,
            None => Decimal::ZERO,
        };

        let annual_benefit = match savings_base {
            Some(_) => savings
                .checked_add(growth)
                .ok_or_else(|| overflowed("annual_benefit"))?,
            None => profit
                .checked_mul(Decimal::from(12))
                .ok_or_else(|| overflowed("annual_benefit"))?
                / Decimal::from(profile.timeframe_months),
        };

        Ok(BenefitBreakdown {
            savings,
            growth,
            annual_benefit,
        })
    }

    /// Wrap a result for downstream consumers
    pub fn report(&self, profile: &BusinessProfile, result: RoiResult) -> CalculationReport {
        CalculationReport {
            id: Uuid::new_v4(),
            calculated_at: Utc::now(),
            profile: profile.clone(),
            result,
        }
    }
}

impl Default for RoiEngine {
    fn default() -> Self {
        Self {
            tables: PricingTables::default(),
            config: EngineConfig::default(),
        }
    }
}
