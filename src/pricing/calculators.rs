//! Core ROI calculation functions.
//!
//! Pure functions for the financial math - no I/O, no randomness.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{EngineError, Result};

use super::responses::YearProjection;

/// Round to the given decimal places, ties away from zero.
///
/// This matches JavaScript's `Math.round` for the non-negative values the
/// calculators produce, which is what the published figures were built on.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use neuroexpert_roi::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage to a whole number
pub fn round_percent(value: Decimal) -> Result<i64> {
    round_money(value, 0).to_i64().ok_or_else(|| {
        EngineError::invalid_input("percent", format!("{} does not fit a whole percent", value))
    })
}

pub(crate) fn overflowed(field: &str) -> EngineError {
    EngineError::invalid_input(field, "amount is too large to calculate with")
}

/// `profit = investment * industry_coef * scale_coef - investment`
pub fn compute_profit(
    investment: Decimal,
    industry_coef: Decimal,
    scale_coef: Decimal,
) -> Result<Decimal> {
    investment
        .checked_mul(industry_coef)
        .and_then(|gross| gross.checked_mul(scale_coef))
        .and_then(|gross| gross.checked_sub(investment))
        .ok_or_else(|| overflowed("investment"))
}

/// Unrounded ROI percent. Fails fast on a non-positive investment.
pub fn roi_ratio_percent(profit: Decimal, investment: Decimal) -> Result<Decimal> {
    if investment <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "investment",
            format!("must be greater than zero, got {}", investment),
        ));
    }
    Ok(profit / investment * Decimal::ONE_HUNDRED)
}

/// `roi = round(profit / investment * 100)`
pub fn compute_roi_percent(profit: Decimal, investment: Decimal) -> Result<i64> {
    round_percent(roi_ratio_percent(profit, investment)?)
}

/// Net present value: `sum(cash_flows[t] / (1 + rate)^t)` for `t = 0..n-1`.
///
/// `cash_flows[0]` is the (negative) initial outlay and is not discounted.
pub fn compute_npv(cash_flows: &[Decimal], discount_rate: Decimal) -> Result<Decimal> {
    let base = Decimal::ONE + discount_rate;
    if base <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "discount_rate",
            format!("must be greater than -1, got {}", discount_rate),
        ));
    }

    let mut npv = Decimal::ZERO;
    let mut factor = Decimal::ONE;
    for (t, cash_flow) in cash_flows.iter().enumerate() {
        if t > 0 {
            factor = factor.checked_mul(base).ok_or_else(|| {
                EngineError::invalid_input("cash_flows", "discount factor overflowed")
            })?;
        }
        npv = cash_flow
            .checked_div(factor)
            .and_then(|discounted| npv.checked_add(discounted))
            .ok_or_else(|| overflowed("cash_flows"))?;
    }
    Ok(npv)
}

pub const IRR_MAX_ITERATIONS: u32 = 100;
const IRR_START_RATE: Decimal = dec!(0.10);
const IRR_STEP_UP: Decimal = dec!(0.01);
const IRR_STEP_DOWN: Decimal = dec!(0.001);
const IRR_NPV_TOLERANCE: Decimal = dec!(0.01);
const IRR_STALL_TOLERANCE: Decimal = dec!(0.0001);

/// Outcome of the bounded IRR search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrrEstimate {
    pub rate: Decimal,
    pub iterations: u32,
    /// True when `|NPV| < 0.01` was reached
    pub converged: bool,
}

/// Approximate internal rate of return.
///
/// Fixed-step search starting at 10%: +1% while NPV is positive, -0.1% while
/// it is negative. Stops after [`IRR_MAX_ITERATIONS`], when `|NPV| < 0.01`, or
/// when successive NPVs differ by less than 0.0001. The step sizes are coarse
/// so the search usually ends oscillating around the root; the last rate
/// tried is returned as a best effort. Neither non-convergence nor an NPV
/// that cannot be evaluated is an error.
pub fn compute_irr(cash_flows: &[Decimal]) -> IrrEstimate {
    let mut rate = IRR_START_RATE;
    let mut last_npv = Decimal::ZERO;

    for i in 0..IRR_MAX_ITERATIONS {
        let npv = match compute_npv(cash_flows, rate) {
            Ok(npv) => npv,
            Err(err) => {
                tracing::debug!(%rate, error = %err, "NPV not computable, stopping IRR search");
                return IrrEstimate {
                    rate,
                    iterations: i,
                    converged: false,
                };
            }
        };
        if npv.abs() < IRR_NPV_TOLERANCE {
            return IrrEstimate {
                rate,
                iterations: i + 1,
                converged: true,
            };
        }

        if npv > Decimal::ZERO {
            rate += IRR_STEP_UP;
        } else {
            rate -= IRR_STEP_DOWN;
        }

        if (npv - last_npv).abs() < IRR_STALL_TOLERANCE {
            return IrrEstimate {
                rate,
                iterations: i + 1,
                converged: false,
            };
        }
        last_npv = npv;
    }

    IrrEstimate {
        rate,
        iterations: IRR_MAX_ITERATIONS,
        converged: false,
    }
}

/// Months until `amount` is recovered from a yearly benefit, rounded up.
///
/// Returns `None` when the benefit is not positive (never recovered).
pub fn months_to_recover(amount: Decimal, annual_benefit: Decimal) -> Option<u32> {
    if annual_benefit <= Decimal::ZERO {
        return None;
    }
    let monthly = annual_benefit / Decimal::from(12);
    amount.checked_div(monthly)?.ceil().to_u32()
}

/// Number of annual cash-flow periods covering the timeframe
pub fn periods_for_timeframe(timeframe_months: u32) -> u32 {
    timeframe_months.div_ceil(12).max(1)
}

/// `[-price, b, b*(1+g), b*(1+g)^2, ...]` with `periods` yearly inflows
pub fn build_cash_flows(
    price: Decimal,
    annual_benefit: Decimal,
    periods: u32,
    growth_rate: Decimal,
) -> Result<Vec<Decimal>> {
    let mut flows = Vec::with_capacity(periods as usize + 1);
    flows.push(-price);

    let growth = Decimal::ONE + growth_rate;
    let mut inflow = annual_benefit;
    for period in 0..periods {
        if period > 0 {
            inflow = inflow.checked_mul(growth).ok_or_else(|| overflowed("cash_flows"))?;
        }
        flows.push(inflow);
    }
    Ok(flows)
}

/// Benefit weighting per year: ramp-up, optimisation, full return
pub const YEAR_FACTORS: [Decimal; 3] = [dec!(0.7), dec!(1.2), dec!(1.5)];

/// Three-year profit projection; the price is charged against year one
pub fn project_years(annual_benefit: Decimal, price: Decimal) -> Result<Vec<YearProjection>> {
    YEAR_FACTORS
        .iter()
        .enumerate()
        .map(|(i, factor)| {
            let gross = annual_benefit
                .checked_mul(*factor)
                .ok_or_else(|| overflowed("annual_benefit"))?;
            let profit = if i == 0 { gross - price } else { gross };
            Ok(YearProjection {
                year: i as u32 + 1,
                profit: round_money(profit, 0),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_ties_away_from_zero() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(3));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(4.5), 0), dec!(5));
        assert_eq!(round_money(dec!(-2.5), 0), dec!(-3));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
        assert_eq!(round_money(dec!(1125000.4), 0), dec!(1125000));
        assert_eq!(round_money(dec!(0), 0), dec!(0));
    }

    #[test]
    fn test_round_percent() {
        assert_eq!(round_percent(dec!(224.5)).unwrap(), 225);
        assert_eq!(round_percent(dec!(65.0)).unwrap(), 65);
        assert_eq!(round_percent(dec!(-12.4)).unwrap(), -12);
    }

    // ==================== profit / ROI tests ====================

    #[test]
    fn test_profit_for_it_medium() {
        let profit = compute_profit(dec!(500000), dec!(2.5), dec!(1.3)).unwrap();
        assert_eq!(profit, dec!(1125000));
        assert_eq!(compute_roi_percent(profit, dec!(500000)).unwrap(), 225);
    }

    #[test]
    fn test_profit_for_retail_small() {
        // 1.8 * 1.1 = 1.98 -> 98% ROI
        let profit = compute_profit(dec!(1000000), dec!(1.8), dec!(1.1)).unwrap();
        assert_eq!(profit, dec!(980000));
        assert_eq!(compute_roi_percent(profit, dec!(1000000)).unwrap(), 98);
    }

    #[test]
    fn test_profit_overflow_is_invalid_input() {
        let err = compute_profit(dec!(50000000000000000000000000000), dec!(2.5), dec!(1.3))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { ref field, .. } if field == "investment"));
    }

    #[test]
    fn test_roi_rejects_zero_investment() {
        let err = compute_roi_percent(dec!(100), dec!(0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_roi_rejects_negative_investment() {
        assert!(compute_roi_percent(dec!(100), dec!(-10)).is_err());
    }

    // ==================== NPV tests ====================

    #[test]
    fn test_npv_reference_cash_flows() {
        let flows = [dec!(-100000), dec!(50000), dec!(50000), dec!(50000)];
        let npv = compute_npv(&flows, dec!(0.1)).unwrap();

        let expected = dec!(-100000) + dec!(50000) / dec!(1.1) + dec!(50000) / dec!(1.21)
            + dec!(50000) / dec!(1.331);
        assert!((npv - expected).abs() < dec!(0.000001));
        assert_eq!(round_money(npv, 0), dec!(24343));
    }

    #[test]
    fn test_npv_zero_rate_is_plain_sum() {
        let flows = [dec!(-10), dec!(4), dec!(4), dec!(4)];
        assert_eq!(compute_npv(&flows, dec!(0)).unwrap(), dec!(2));
    }

    #[test]
    fn test_npv_empty_is_zero() {
        assert_eq!(compute_npv(&[], dec!(0.1)).unwrap(), dec!(0));
    }

    #[test]
    fn test_npv_overflow_is_an_error_not_a_panic() {
        let flows = vec![dec!(100); 800];
        let err = compute_npv(&flows, dec!(0.1)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));

        // A rate near -1 blows up the discounted values instead
        let flows = vec![dec!(1000000000000000); 40];
        assert!(compute_npv(&flows, dec!(-0.99)).is_err());
    }

    #[test]
    fn test_npv_rejects_rate_at_minus_one() {
        assert!(compute_npv(&[dec!(1)], dec!(-1)).is_err());
    }

    // ==================== IRR tests ====================

    #[test]
    fn test_irr_reference_cash_flows() {
        let flows = [dec!(-100000), dec!(50000), dec!(50000), dec!(50000)];
        let irr = compute_irr(&flows);

        // True IRR is ~23.4%; the coarse search ends oscillating around it
        assert!(irr.iterations <= IRR_MAX_ITERATIONS);
        assert!(irr.rate >= dec!(0.23) && irr.rate <= dec!(0.25), "rate {}", irr.rate);
        let npv = compute_npv(&flows, irr.rate).unwrap();
        assert!(npv.abs() < dec!(2000), "npv {}", npv);
    }

    #[test]
    fn test_irr_converges_exactly_at_start_rate() {
        // NPV at 10% is exactly zero
        let flows = [dec!(-100), dec!(110)];
        let irr = compute_irr(&flows);
        assert!(irr.converged);
        assert_eq!(irr.rate, dec!(0.10));
        assert_eq!(irr.iterations, 1);
    }

    #[test]
    fn test_irr_pathological_flows_do_not_fail() {
        // All inflows: NPV is always positive, the rate just keeps climbing
        let flows = [dec!(100), dec!(100), dec!(100)];
        let irr = compute_irr(&flows);
        assert!(!irr.converged);
        assert!(irr.iterations <= IRR_MAX_ITERATIONS);
    }

    #[test]
    fn test_irr_stops_with_best_effort_when_npv_overflows() {
        let mut flows = vec![dec!(-1000000)];
        flows.extend(std::iter::repeat(dec!(100000)).take(800));
        let irr = compute_irr(&flows);
        assert!(!irr.converged);
        assert_eq!(irr.rate, dec!(0.10));
        assert_eq!(irr.iterations, 0);
    }

    // ==================== payback / cash flow tests ====================

    #[test]
    fn test_months_to_recover_rounds_up() {
        // 1_200_000 / (1_000_000 / 12) = 14.4 -> 15
        assert_eq!(months_to_recover(dec!(1200000), dec!(1000000)), Some(15));
        assert_eq!(months_to_recover(dec!(1200000), dec!(1200000)), Some(12));
    }

    #[test]
    fn test_months_to_recover_without_benefit() {
        assert_eq!(months_to_recover(dec!(1000), dec!(0)), None);
        assert_eq!(months_to_recover(dec!(1000), dec!(-5)), None);
    }

    #[test]
    fn test_periods_for_timeframe() {
        assert_eq!(periods_for_timeframe(1), 1);
        assert_eq!(periods_for_timeframe(12), 1);
        assert_eq!(periods_for_timeframe(13), 2);
        assert_eq!(periods_for_timeframe(36), 3);
    }

    #[test]
    fn test_build_cash_flows_with_growth() {
        let flows = build_cash_flows(dec!(1000), dec!(100), 3, dec!(0.05)).unwrap();
        assert_eq!(flows, vec![dec!(-1000), dec!(100), dec!(105.00), dec!(110.2500)]);
    }

    #[test]
    fn test_build_cash_flows_overflow() {
        let err = build_cash_flows(dec!(1000), dec!(1000000000000000), 60, dec!(1)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_months_to_recover_tiny_benefit() {
        assert_eq!(
            months_to_recover(dec!(10000000000000000000000000000), dec!(0.0000000001)),
            None
        );
    }

    #[test]
    fn test_project_years() {
        let years = project_years(dec!(1000000), dec!(500000)).unwrap();
        assert_eq!(years.len(), 3);
        assert_eq!(years[0].profit, dec!(200000));
        assert_eq!(years[1].profit, dec!(1200000));
        assert_eq!(years[2].profit, dec!(1500000));
        assert_eq!(years[2].year, 3);
    }
}
