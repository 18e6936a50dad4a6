#![allow(dead_code)]

use chrono::NaiveDate;
pub use sigtrader::domain::ohlcv::PricePoint;
use sigtrader::domain::backtest::BacktestConfig;
use sigtrader::domain::error::SigtraderError;
use sigtrader::domain::strategy::StrategyParams;
use sigtrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, SigtraderError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(SigtraderError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_tickers(&self) -> Result<Vec<String>, SigtraderError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SigtraderError> {
        match self.data.get(ticker) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> PricePoint {
    PricePoint {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
    }
}

/// Consecutive calendar days starting at `start_date`, one bar per close.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::from_close(start + chrono::Duration::days(i as i64), close))
        .collect()
}

/// A straight line: `start_price`, `start_price + step`, ...
pub fn generate_bars(start_date: &str, count: usize, start_price: f64, step: f64) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + step * i as f64).collect();
    bars_from_closes(start_date, &closes)
}

/// Decline, then a sharp rally, then a slow fade: enough movement to
/// produce buys and exits with short windows.
pub fn swing_closes() -> Vec<f64> {
    let mut closes = Vec::new();
    for i in 0..20 {
        closes.push(100.0 - i as f64);
    }
    for i in 0..10 {
        closes.push(81.0 + 3.0 * i as f64);
    }
    for i in 0..20 {
        closes.push(108.0 - 0.5 * i as f64 + if i % 2 == 0 { 1.0 } else { -1.0 });
    }
    closes
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        ticker: "TEST".into(),
        start_date: date(2020, 1, 1),
        end_date: date(2024, 12, 31),
        initial_capital: 100_000.0,
        risk_free_rate: 0.0,
    }
}

pub fn short_params() -> StrategyParams {
    StrategyParams {
        short_window: 3,
        long_window: 8,
        momentum_window: 5,
        ..Default::default()
    }
}
