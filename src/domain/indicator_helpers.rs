//! Shared helper functions for indicator calculations.

use crate::domain::indicator::momentum::calculate_momentum;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorPoint, IndicatorSet};
use crate::domain::ohlcv::PricePoint;
use crate::domain::strategy::StrategyParams;

/// Trailing arithmetic mean over `window` values.
///
/// Index `i` is `None` until `window` values are available; no partial
/// windows. Each window is summed directly rather than with a running sum,
/// so a run of exact zeros averages to exactly zero.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let sum: f64 = values[i + 1 - window..=i].iter().sum();
                Some(sum / window as f64)
            }
        })
        .collect()
}

/// Pairs each bar's date with the corresponding computed value.
pub fn dated_points(bars: &[PricePoint], values: Vec<Option<f64>>) -> Vec<IndicatorPoint> {
    bars.iter()
        .zip(values)
        .map(|(bar, value)| IndicatorPoint {
            date: bar.date,
            value,
        })
        .collect()
}

/// Computes the three indicators the signal rule needs.
pub fn compute_indicators(bars: &[PricePoint], params: &StrategyParams) -> IndicatorSet {
    IndicatorSet {
        sma_short: calculate_sma(bars, params.short_window),
        sma_long: calculate_sma(bars, params.long_window),
        momentum: calculate_momentum(bars, params.momentum_window),
    }
}
