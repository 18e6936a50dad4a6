//! CSV report adapter implementing ReportPort.
//!
//! Writes two files next to the given stem:
//! - `<stem>_trades.csv`: the trade log, one row per fill
//! - `<stem>_series.csv`: every bar with its indicators and signal, blank
//!   where undefined, for charting

use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::backtest::BacktestRun;
use crate::domain::error::SigtraderError;
use crate::domain::signal::Signal;
use crate::ports::report_port::ReportPort;

const TRADE_HEADER: [&str; 5] = ["date", "action", "price", "shares", "value"];

#[derive(Debug, Serialize)]
struct TradeCsvRow {
    date: String,
    action: &'static str,
    price: f64,
    shares: u64,
    value: f64,
}

#[derive(Debug, Serialize)]
struct SeriesCsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
    sma_short: Option<f64>,
    sma_long: Option<f64>,
    momentum: Option<f64>,
    signal: Option<String>,
}

#[derive(Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn trades_path(stem: &Path) -> PathBuf {
        suffixed(stem, "_trades.csv")
    }

    pub fn series_path(stem: &Path) -> PathBuf {
        suffixed(stem, "_series.csv")
    }

    /// Header first, so a run without trades still gets one.
    fn write_trades(run: &BacktestRun, path: &Path) -> Result<(), SigtraderError> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        wtr.write_record(TRADE_HEADER)?;
        for trade in run.result.trades() {
            wtr.serialize(TradeCsvRow {
                date: trade.date.to_string(),
                action: trade.kind.label(),
                price: trade.price,
                shares: trade.shares,
                value: trade.shares as f64 * trade.price,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_series(run: &BacktestRun, path: &Path) -> Result<(), SigtraderError> {
        let signals: HashMap<_, Signal> =
            run.signals.iter().map(|s| (s.date, s.signal)).collect();

        let mut wtr = csv::Writer::from_path(path)?;
        for (i, bar) in run.bars.iter().enumerate() {
            wtr.serialize(SeriesCsvRow {
                date: bar.date.to_string(),
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                sma_short: run.indicators.sma_short.value_at(i),
                sma_long: run.indicators.sma_long.value_at(i),
                momentum: run.indicators.momentum.value_at(i),
                signal: signals.get(&bar.date).map(|s| s.to_string()),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn suffixed(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, run: &BacktestRun, output_stem: &Path) -> Result<Vec<PathBuf>, SigtraderError> {
        if let Some(parent) = output_stem.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let trades = Self::trades_path(output_stem);
        let series = Self::series_path(output_stem);
        Self::write_trades(run, &trades)?;
        Self::write_series(run, &series)?;
        Ok(vec![trades, series])
    }
}
