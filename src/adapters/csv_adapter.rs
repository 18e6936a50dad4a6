//! CSV file data adapter.
//!
//! One file per ticker, `<dir>/<TICKER>.csv`, with a header row. Both
//! `date,open,high,low,close,volume` and the capitalised export layout
//! (`Date,Open,High,Low,Close,Adj Close,Volume`) are accepted. Rows whose
//! prices are blank or `null` are skipped with a warning.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::{PricePoint, check_series};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::PathBuf;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Open", deserialize_with = "nullable")]
    open: Option<f64>,
    #[serde(alias = "High", deserialize_with = "nullable")]
    high: Option<f64>,
    #[serde(alias = "Low", deserialize_with = "nullable")]
    low: Option<f64>,
    #[serde(alias = "Close", deserialize_with = "nullable")]
    close: Option<f64>,
    #[serde(alias = "Volume", default, deserialize_with = "nullable")]
    volume: Option<f64>,
}

/// Blank and `null` become `None`; anything else must parse as a number.
fn nullable<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "" | "null" | "NULL" => Ok(None),
        value => value.parse::<f64>().map(Some).map_err(serde::de::Error::custom),
    }
}

impl CsvRow {
    /// `Ok(None)` when any price is missing.
    fn into_price_point(self) -> Result<Option<PricePoint>, SigtraderError> {
        // Exports sometimes carry a time suffix: "2024-01-02 00:00:00".
        let day = self.date.split_whitespace().next().unwrap_or_default();
        let date = NaiveDate::parse_from_str(day, DATE_FORMAT).map_err(|e| {
            SigtraderError::DataSource {
                reason: format!("invalid date '{}': {}", self.date, e),
            }
        })?;
        let (Some(open), Some(high), Some(low), Some(close)) =
            (self.open, self.high, self.low, self.close)
        else {
            return Ok(None);
        };
        Ok(Some(PricePoint {
            date,
            open,
            high,
            low,
            close,
            volume: self.volume.unwrap_or_default().round() as i64,
        }))
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker.to_uppercase()))
    }

    fn read_all(&self, ticker: &str) -> Result<Vec<PricePoint>, SigtraderError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| SigtraderError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut bars = Vec::new();
        for record in rdr.deserialize::<CsvRow>() {
            let row = record.map_err(|e| SigtraderError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            let raw_date = row.date.clone();
            match row.into_price_point()? {
                Some(bar) => bars.push(bar),
                None => warn!("{}: skipping incomplete row {}", path.display(), raw_date),
            }
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, SigtraderError> {
        let bars: Vec<PricePoint> = self
            .read_all(ticker)?
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect();
        check_series(&bars)?;
        Ok(bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, SigtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SigtraderError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SigtraderError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            if let Some(ticker) = name.to_string_lossy().strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SigtraderError> {
        if !self.csv_path(ticker).exists() {
            return Ok(None);
        }
        let bars = self.read_all(ticker)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
