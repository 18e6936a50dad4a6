//! Daily price bar representation.

use chrono::NaiveDate;

use super::error::SigtraderError;

/// One trading day of a single security.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl PricePoint {
    /// A bar where open/high/low all equal the close.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        PricePoint {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// Checks the invariants the simulator relies on: dates strictly ascending
/// (so no duplicates) and every close finite and positive.
pub fn check_series(bars: &[PricePoint]) -> Result<(), SigtraderError> {
    for (i, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(SigtraderError::InvalidPriceData {
                date: bar.date,
                reason: format!("close must be positive, got {}", bar.close),
            });
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(SigtraderError::InvalidPriceData {
                date: bar.date,
                reason: format!(
                    "dates must be strictly ascending (follows {})",
                    bars[i - 1].date
                ),
            });
        }
    }
    Ok(())
}

/// Closing prices in series order.
pub fn closes(bars: &[PricePoint]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
