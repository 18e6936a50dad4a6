//! Backtest engine and event loop.
//!
//! `simulate` is the single forward pass over signal rows. `run_backtest`
//! chains the whole pipeline (indicators, alignment, signals, simulation,
//! reporting) for one security.

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::domain::aligned::{AlignedRow, align_rows};
use crate::domain::error::SigtraderError;
use crate::domain::execution::{EntryResult, check_exit, enter_long, exit_position};
use crate::domain::indicator::IndicatorSet;
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::{PricePoint, check_series};
use crate::domain::portfolio::Portfolio;
use crate::domain::position::{Position, TradeRecord};
use crate::domain::report::PerformanceReport;
use crate::domain::signal::{Signal, SignalRow, generate_signals};
use crate::domain::strategy::StrategyParams;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub risk_free_rate: f64,
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), SigtraderError> {
        if !(self.initial_capital > 0.0) || !self.initial_capital.is_finite() {
            return Err(SigtraderError::InvalidConfiguration {
                reason: format!(
                    "initial capital must be positive, got {}",
                    self.initial_capital
                ),
            });
        }
        if self.start_date >= self.end_date {
            return Err(SigtraderError::InvalidConfiguration {
                reason: format!(
                    "start date {} must be before end date {}",
                    self.start_date, self.end_date
                ),
            });
        }
        Ok(())
    }
}

/// Final state of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub portfolio: Portfolio,
    /// Buy signals that sized to zero shares.
    pub skipped_entries: usize,
}

impl SimulationResult {
    pub fn final_cash(&self) -> f64 {
        self.portfolio.cash
    }

    pub fn final_position(&self) -> &Position {
        &self.portfolio.position
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.portfolio.trades
    }
}

/// Replays `rows` in order against a fresh portfolio.
///
/// Per row: a buy signal opens a position when flat; otherwise an open
/// position is checked for stop-loss, then take-profit, then a sell signal,
/// and the first match closes it. A position opened on a row is never
/// closed on that same row. Whatever is open after the last row stays open.
pub fn simulate(rows: &[SignalRow], params: &StrategyParams, initial_capital: f64) -> SimulationResult {
    let mut portfolio = Portfolio::new(initial_capital);
    let mut skipped_entries = 0;

    for row in rows {
        if !(row.close > 0.0) || !row.close.is_finite() {
            warn!("{}: skipping non-positive close {}", row.date, row.close);
            continue;
        }

        if portfolio.position.is_flat() {
            if row.signal == Signal::Buy {
                match enter_long(&mut portfolio, row.date, row.close, params) {
                    EntryResult::InsufficientCapital => skipped_entries += 1,
                    EntryResult::Entered { .. } | EntryResult::AlreadyLong => {}
                }
            }
        } else if let Some(kind) = check_exit(
            &portfolio.position,
            row.close,
            row.signal == Signal::Sell,
            params,
        ) {
            exit_position(&mut portfolio, row.date, row.close, kind);
        }

        portfolio.record_equity(row.date, row.close);
    }

    debug!(
        "simulation finished: {} trades, {} skipped entries, cash {:.2}, open shares {}",
        portfolio.trades.len(),
        skipped_entries,
        portfolio.cash,
        portfolio.position.shares()
    );

    SimulationResult {
        portfolio,
        skipped_entries,
    }
}

/// Everything one run produced, for presentation.
#[derive(Debug, Clone)]
pub struct BacktestRun {
    pub config: BacktestConfig,
    pub params: StrategyParams,
    pub bars: Vec<PricePoint>,
    pub indicators: IndicatorSet,
    pub rows: Vec<AlignedRow>,
    pub signals: Vec<SignalRow>,
    pub result: SimulationResult,
    pub report: PerformanceReport,
    pub metrics: Metrics,
}

impl BacktestRun {
    pub fn signal_count(&self, signal: Signal) -> usize {
        self.signals.iter().filter(|s| s.signal == signal).count()
    }
}

pub fn run_backtest(
    bars: Vec<PricePoint>,
    params: &StrategyParams,
    config: &BacktestConfig,
) -> Result<BacktestRun, SigtraderError> {
    config.validate()?;
    params.validate()?;

    if bars.is_empty() {
        return Err(SigtraderError::NoData {
            ticker: config.ticker.clone(),
        });
    }
    check_series(&bars)?;

    let indicators = compute_indicators(&bars, params);
    let rows = align_rows(&bars, &indicators);
    if rows.is_empty() {
        return Err(SigtraderError::InsufficientData {
            ticker: config.ticker.clone(),
            bars: bars.len(),
            minimum: params.min_bars(),
        });
    }
    info!(
        "{}: {} bars, {} usable after indicator warm-up",
        config.ticker,
        bars.len(),
        rows.len()
    );

    let signals = generate_signals(&rows);
    let result = simulate(&signals, params, config.initial_capital);
    let report =
        PerformanceReport::from_rows(&result, &signals, config.initial_capital, &config.ticker)?;
    let metrics = Metrics::compute(&result.portfolio, config.risk_free_rate);

    Ok(BacktestRun {
        config: config.clone(),
        params: params.clone(),
        bars,
        indicators,
        rows,
        signals,
        result,
        report,
        metrics,
    })
}
