//! Momentum oscillator (RSI-style, simple rolling averages).
//!
//! Day-over-day changes are split into gains and losses, each averaged with
//! the same trailing mean as the SMA (no Wilder smoothing):
//!
//! Formula: 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: 100
//! If both are 0 (flat run): undefined
//!
//! The first bar has no prior close and counts as a zero change, so the
//! oscillator is first defined at index `period - 1`.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{dated_points, rolling_mean};
use crate::domain::ohlcv::PricePoint;

pub fn calculate_momentum(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let mut gains = Vec::with_capacity(bars.len());
    let mut losses = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let change = if i == 0 {
            0.0
        } else {
            bar.close - bars[i - 1].close
        };
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let avg_gains = rolling_mean(&gains, period);
    let avg_losses = rolling_mean(&losses, period);

    let values = avg_gains
        .into_iter()
        .zip(avg_losses)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(gain), Some(loss)) => oscillator(gain, loss),
            _ => None,
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Momentum(period),
        values: dated_points(bars, values),
    }
}

/// Maps average gain/loss onto [0, 100]; `None` for 0/0.
pub fn oscillator(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { None } else { Some(100.0) }
    } else {
        Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
    }
}
