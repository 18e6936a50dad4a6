//! Market data port trait.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::PricePoint;
use chrono::NaiveDate;

/// Supplies a security's daily bars, ascending by date.
pub trait DataPort {
    /// Bars with `start_date <= date <= end_date`. An empty vector means the
    /// provider has nothing for that range.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, SigtraderError>;

    fn list_tickers(&self) -> Result<Vec<String>, SigtraderError>;

    /// First date, last date, and bar count, or `None` when nothing is stored.
    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SigtraderError>;
}
