//! Monte Carlo perturbation of the base ROI.
//!
//! Each trial multiplies the base ROI by four independent uniform factors
//! (market, execution, competition, economy). The random source is injected so
//! seeded runs are reproducible.

use rand::Rng;

use crate::error::{EngineError, Result};

use super::responses::MonteCarloSummary;

pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Closed sampling ranges for the market, execution, competition and
/// economic factors, in that order
pub const FACTOR_RANGES: [(f64, f64); 4] = [(0.8, 1.2), (0.7, 1.2), (0.9, 1.1), (0.85, 1.15)];

/// Run `iterations` trials around `base_roi` (a percent value).
pub fn simulate<R: Rng + ?Sized>(
    base_roi: f64,
    iterations: usize,
    rng: &mut R,
) -> Result<MonteCarloSummary> {
    if iterations == 0 {
        return Err(EngineError::invalid_input(
            "iterations",
            "must be a positive number of trials",
        ));
    }
    if !base_roi.is_finite() {
        return Err(EngineError::invalid_input(
            "base_roi",
            format!("must be finite, got {}", base_roi),
        ));
    }

    let samples: Vec<f64> = (0..iterations)
        .map(|_| {
            FACTOR_RANGES
                .iter()
                .fold(base_roi, |roi, (low, high)| roi * rng.gen_range(*low..=*high))
        })
        .collect();

    Ok(summarize(samples))
}

/// Sort the samples and extract the summary statistics.
///
/// Percentiles are read by index (`floor(n * q)`, clamped to the last
/// element); the standard deviation is the population one.
pub fn summarize(mut samples: Vec<f64>) -> MonteCarloSummary {
    samples.sort_by(|a, b| a.total_cmp(b));

    let n = samples.len();
    if n == 0 {
        return MonteCarloSummary::default();
    }
    let at = |index: usize| samples[index.min(n - 1)];

    let mean = samples.iter().sum::<f64>() / n as f64;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;

    MonteCarloSummary {
        mean,
        median: at(n / 2),
        p5: at(n * 5 / 100),
        p95: at(n * 95 / 100),
        std_dev: variance.sqrt(),
        iterations: n,
    }
}
