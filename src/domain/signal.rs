//! Per-date trading signal derived from indicator values.

use chrono::NaiveDate;
use std::fmt;

use crate::domain::aligned::AlignedRow;

/// Momentum below this, with the short average above the long, is a buy.
pub const BUY_MOMENTUM_CEILING: f64 = 40.0;
/// Momentum above this is a sell regardless of the averages.
pub const SELL_MOMENTUM_FLOOR: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub close: f64,
    pub signal: Signal,
}

/// Buy is tested first; a matching sell condition then takes precedence.
pub fn classify(row: &AlignedRow) -> Signal {
    let mut signal = Signal::Hold;
    if row.sma_short > row.sma_long && row.momentum < BUY_MOMENTUM_CEILING {
        signal = Signal::Buy;
    }
    if row.sma_short < row.sma_long || row.momentum > SELL_MOMENTUM_FLOOR {
        signal = Signal::Sell;
    }
    signal
}

pub fn generate_signals(rows: &[AlignedRow]) -> Vec<SignalRow> {
    rows.iter()
        .map(|row| SignalRow {
            date: row.date,
            close: row.close,
            signal: classify(row),
        })
        .collect()
}
