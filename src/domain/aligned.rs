//! Alignment of bars with their indicator values.
//!
//! Produces a new sequence containing only the dates where every indicator
//! is defined. The input bars and indicator series are left untouched.

use chrono::NaiveDate;

use crate::domain::indicator::IndicatorSet;
use crate::domain::ohlcv::PricePoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub momentum: f64,
}

/// Joins bars and indicators by position, dropping any row with an
/// undefined indicator.
pub fn align_rows(bars: &[PricePoint], indicators: &IndicatorSet) -> Vec<AlignedRow> {
    bars.iter()
        .enumerate()
        .filter_map(|(i, bar)| {
            let sma_short = indicators.sma_short.value_at(i)?;
            let sma_long = indicators.sma_long.value_at(i)?;
            let momentum = indicators.momentum.value_at(i)?;
            Some(AlignedRow {
                date: bar.date,
                close: bar.close,
                sma_short,
                sma_long,
                momentum,
            })
        })
        .collect()
}
