//! Simple moving average of closing prices.
//!
//! Warmup: the first `period - 1` bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{dated_points, rolling_mean};
use crate::domain::ohlcv::{PricePoint, closes};

pub fn calculate_sma(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let means = rolling_mean(&closes(bars), period);
    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values: dated_points(bars, means),
    }
}
