//! Integration tests for the backtest pipeline.
//!
//! Tests cover:
//! - Full pipeline with a mock data port and known trades
//! - Exit priority (stop-loss, take-profit, signal) on a real series
//! - Degenerate inputs: flat prices, too few bars, empty provider
//! - Entry sizing and stop-loss boundary scenarios
//! - Independent runs on separate threads
//! - CSV data in, CSV reports out

mod common;

use approx::assert_relative_eq;
use common::*;
use sigtrader::adapters::csv_adapter::CsvAdapter;
use sigtrader::adapters::csv_report_adapter::CsvReportAdapter;
use sigtrader::cli::run_backtest_pipeline;
use sigtrader::domain::aligned::align_rows;
use sigtrader::domain::backtest::{BacktestRun, run_backtest, simulate};
use sigtrader::domain::error::SigtraderError;
use sigtrader::domain::indicator_helpers::compute_indicators;
use sigtrader::domain::position::TradeKind;
use sigtrader::domain::report::Outcome;
use sigtrader::domain::signal::{Signal, SignalRow, generate_signals};
use sigtrader::domain::strategy::StrategyParams;
use sigtrader::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Two pullbacks inside an uptrend, a sharp drop, then a recovery.
fn pullback_closes() -> Vec<f64> {
    let runs: [(f64, usize); 8] = [
        (2.0, 12),
        (-0.5, 3),
        (2.0, 3),
        (-0.5, 3),
        (-4.0, 3),
        (1.0, 4),
        (-0.5, 3),
        (3.0, 5),
    ];
    let steps = runs
        .iter()
        .flat_map(|&(step, count)| std::iter::repeat_n(step, count));

    let mut closes = vec![100.0];
    for step in steps {
        let last = *closes.last().unwrap();
        closes.push(last + step);
    }
    closes
}

fn pullback_params() -> StrategyParams {
    StrategyParams {
        short_window: 2,
        long_window: 10,
        momentum_window: 3,
        ..Default::default()
    }
}

fn pullback_bars() -> Vec<PricePoint> {
    bars_from_closes("2024-01-01", &pullback_closes())
}

struct RecordingReportPort {
    written: RefCell<Vec<(String, usize)>>,
}

impl RecordingReportPort {
    fn new() -> Self {
        Self {
            written: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for RecordingReportPort {
    fn write(&self, run: &BacktestRun, output_stem: &Path) -> Result<Vec<PathBuf>, SigtraderError> {
        self.written
            .borrow_mut()
            .push((run.config.ticker.clone(), run.result.trades().len()));
        Ok(vec![output_stem.to_path_buf()])
    }
}

mod full_backtest_pipeline {
    use super::*;

    #[test]
    fn known_trades_with_mock_data_port() {
        let port = MockDataPort::new().with_bars("TEST", pullback_bars());
        let reporter = RecordingReportPort::new();

        let run = run_backtest_pipeline(
            &port,
            &reporter,
            &sample_config(),
            &pullback_params(),
            Path::new("out"),
        )
        .unwrap();

        let trades = run.result.trades();
        let summary: Vec<_> = trades
            .iter()
            .map(|t| (t.kind, t.date, t.price, t.shares))
            .collect();
        assert_eq!(
            summary,
            vec![
                (TradeKind::Entry, date(2024, 1, 16), 122.5, 163),
                (TradeKind::SignalExit, date(2024, 1, 18), 126.5, 163),
                (TradeKind::Entry, date(2024, 1, 22), 127.0, 158),
                (TradeKind::SignalExit, date(2024, 1, 23), 123.0, 158),
            ]
        );
        assert!(run.result.final_position().is_flat());
        assert_relative_eq!(run.result.final_cash(), 100_020.0, epsilon = 1e-9);

        assert_eq!(
            reporter.written.borrow().as_slice(),
            &[("TEST".to_string(), 4)]
        );
    }

    #[test]
    fn report_against_buy_and_hold() {
        let run = run_backtest(pullback_bars(), &pullback_params(), &sample_config()).unwrap();
        let report = &run.report;

        // first retained row is the tenth bar, after the long warm-up
        assert_eq!(run.rows.first().unwrap().date, date(2024, 1, 10));
        assert_eq!(report.first_price, 118.0);
        assert_eq!(report.last_price, 132.5);

        assert_relative_eq!(report.final_value, 100_020.0, epsilon = 1e-9);
        assert_relative_eq!(report.strategy_return_pct, 0.02, epsilon = 1e-9);
        assert_eq!(report.buy_hold_shares, 847);
        assert_relative_eq!(report.buy_hold_final, 112_227.5, epsilon = 1e-9);
        assert_relative_eq!(report.buy_hold_return_pct, 12.2275, epsilon = 1e-9);
        assert_eq!(report.outcome, Outcome::Profit);
        assert!(!report.outperformed_buy_hold());
    }

    #[test]
    fn signals_only_on_retained_rows() {
        let run = run_backtest(pullback_bars(), &pullback_params(), &sample_config()).unwrap();
        assert_eq!(run.bars.len(), 37);
        assert_eq!(run.signals.len(), 28);
        assert_eq!(run.signal_count(Signal::Buy), 2);
        assert_eq!(
            run.signal_count(Signal::Buy)
                + run.signal_count(Signal::Sell)
                + run.signal_count(Signal::Hold),
            run.signals.len()
        );
        for (row, signal) in run.rows.iter().zip(&run.signals) {
            assert_eq!(row.date, signal.date);
        }
    }

    #[test]
    fn metrics_from_round_trips() {
        let run = run_backtest(pullback_bars(), &pullback_params(), &sample_config()).unwrap();
        let metrics = &run.metrics;
        assert_eq!(metrics.round_trips, 2);
        assert_eq!(metrics.trades_won, 1);
        assert_eq!(metrics.trades_lost, 1);
        assert_relative_eq!(metrics.win_rate, 0.5);
        assert!(metrics.max_drawdown > 0.0);
        assert!(metrics.exposure > 0.0 && metrics.exposure < 1.0);
    }

    #[test]
    fn provider_error_is_data_source() {
        let port = MockDataPort::new().with_error("TEST", "connection reset");
        let err = run_backtest_pipeline(
            &port,
            &RecordingReportPort::new(),
            &sample_config(),
            &pullback_params(),
            Path::new("out"),
        )
        .unwrap_err();
        assert!(matches!(err, SigtraderError::DataSource { .. }));
    }

    #[test]
    fn unknown_ticker_is_no_data() {
        let reporter = RecordingReportPort::new();
        let err = run_backtest_pipeline(
            &MockDataPort::new(),
            &reporter,
            &sample_config(),
            &pullback_params(),
            Path::new("out"),
        )
        .unwrap_err();
        assert!(matches!(err, SigtraderError::NoData { .. }));
        assert!(reporter.written.borrow().is_empty());
    }
}

mod exit_priority {
    use super::*;

    #[test]
    fn tight_stop_loss_replaces_signal_exit() {
        let params = StrategyParams {
            stop_loss_pct: 3.0,
            ..pullback_params()
        };
        let run = run_backtest(pullback_bars(), &params, &sample_config()).unwrap();
        let kinds: Vec<_> = run.result.trades().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TradeKind::Entry,
                TradeKind::SignalExit,
                TradeKind::Entry,
                TradeKind::StopLoss
            ]
        );
    }

    #[test]
    fn tight_take_profit_replaces_signal_exit() {
        let params = StrategyParams {
            take_profit_pct: 3.0,
            ..pullback_params()
        };
        let run = run_backtest(pullback_bars(), &params, &sample_config()).unwrap();
        let kinds: Vec<_> = run.result.trades().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TradeKind::Entry,
                TradeKind::TakeProfit,
                TradeKind::Entry,
                TradeKind::SignalExit
            ]
        );
    }

    #[test]
    fn closed_trades_pair_entries_and_exits() {
        let run = run_backtest(pullback_bars(), &pullback_params(), &sample_config()).unwrap();
        let closed = &run.result.portfolio.closed_trades;
        assert_eq!(closed.len(), 2);
        assert_eq!(closed[0].entry_date, date(2024, 1, 16));
        assert_eq!(closed[0].exit_date, date(2024, 1, 18));
        assert_relative_eq!(closed[0].pnl, 163.0 * 4.0);
        assert_relative_eq!(closed[1].pnl, 158.0 * -4.0);
        assert_eq!(closed[1].holding_days(), 1);
    }
}

mod degenerate_inputs {
    use super::*;

    #[test]
    fn flat_series_has_no_buys_and_no_trades() {
        let bars = generate_bars("2020-01-01", 300, 100.0, 0.0);
        let params = StrategyParams::default();

        let indicators = compute_indicators(&bars, &params);
        let rows = align_rows(&bars, &indicators);
        let signals = generate_signals(&rows);
        assert!(signals.iter().all(|s| s.signal != Signal::Buy));

        let result = simulate(&signals, &params, 100_000.0);
        assert!(result.trades().is_empty());
        assert_eq!(result.final_cash(), 100_000.0);

        // every oscillator value is 0/0, so nothing survives alignment
        let err = run_backtest(bars, &params, &sample_config()).unwrap_err();
        assert!(err.is_no_data());
    }

    #[test]
    fn ten_points_with_long_window_200_is_no_data() {
        let bars = generate_bars("2024-01-01", 10, 50.0, 1.0);
        let err = run_backtest(bars, &StrategyParams::default(), &sample_config()).unwrap_err();
        match err {
            SigtraderError::InsufficientData { bars, minimum, .. } => {
                assert_eq!(bars, 10);
                assert_eq!(minimum, 200);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_dates_rejected() {
        let mut bars = pullback_bars();
        bars[5].date = bars[4].date;
        let err = run_backtest(bars, &pullback_params(), &sample_config()).unwrap_err();
        assert!(matches!(err, SigtraderError::InvalidPriceData { .. }));
    }

    #[test]
    fn invalid_configuration_rejected_before_simulation() {
        let params = StrategyParams {
            short_window: 0,
            ..pullback_params()
        };
        let err = run_backtest(pullback_bars(), &params, &sample_config()).unwrap_err();
        assert!(matches!(err, SigtraderError::InvalidConfiguration { .. }));

        let mut config = sample_config();
        config.initial_capital = -1.0;
        let err = run_backtest(pullback_bars(), &pullback_params(), &config).unwrap_err();
        assert!(matches!(err, SigtraderError::InvalidConfiguration { .. }));
    }

    #[test]
    fn failed_run_leaves_next_run_unaffected() {
        let short = generate_bars("2024-01-01", 5, 50.0, 1.0);
        assert!(run_backtest(short, &pullback_params(), &sample_config()).is_err());
        let run = run_backtest(pullback_bars(), &pullback_params(), &sample_config()).unwrap();
        assert_eq!(run.result.trades().len(), 4);
    }
}

mod simulator_scenarios {
    use super::*;

    fn row(day: u32, close: f64, signal: Signal) -> SignalRow {
        SignalRow {
            date: date(2024, 6, day),
            close,
            signal,
        }
    }

    fn params(stop_loss_pct: f64) -> StrategyParams {
        StrategyParams {
            position_size_pct: 20.0,
            stop_loss_pct,
            take_profit_pct: 50.0,
            ..Default::default()
        }
    }

    #[test]
    fn entry_sizing() {
        let result = simulate(&[row(3, 50.0, Signal::Buy)], &params(5.0), 100_000.0);
        let entry = &result.trades()[0];
        assert_eq!(entry.kind, TradeKind::Entry);
        assert_eq!(entry.shares, 400);
        assert_relative_eq!(result.final_cash(), 80_000.0);
    }

    #[test]
    fn stop_loss_boundary() {
        let hit = simulate(
            &[row(3, 100.0, Signal::Buy), row(4, 90.00, Signal::Hold)],
            &params(10.0),
            100_000.0,
        );
        assert_eq!(hit.trades().last().unwrap().kind, TradeKind::StopLoss);

        let miss = simulate(
            &[row(3, 100.0, Signal::Buy), row(4, 90.01, Signal::Hold)],
            &params(10.0),
            100_000.0,
        );
        assert_eq!(miss.trades().len(), 1);
        assert!(miss.final_position().is_long());
    }

    #[test]
    fn open_position_marked_to_last_price() {
        let rows = [row(3, 50.0, Signal::Buy), row(4, 52.0, Signal::Hold)];
        let result = simulate(&rows, &params(10.0), 100_000.0);
        let report =
            sigtrader::domain::report::PerformanceReport::from_rows(&result, &rows, 100_000.0, "X")
                .unwrap();
        assert!(result.final_position().is_long());
        assert_relative_eq!(report.final_value, 80_000.0 + 400.0 * 52.0);
    }

    #[test]
    fn identical_inputs_identical_results() {
        let bars = pullback_bars();
        let first = run_backtest(bars.clone(), &pullback_params(), &sample_config()).unwrap();
        let second = run_backtest(bars, &pullback_params(), &sample_config()).unwrap();
        assert_eq!(first.result, second.result);
        assert_eq!(first.report, second.report);
    }
}

mod parallel_runs {
    use super::*;

    #[test]
    fn independent_runs_on_threads() {
        let configs: Vec<StrategyParams> = [3.0, 5.0, 10.0]
            .into_iter()
            .map(|stop_loss_pct| StrategyParams {
                stop_loss_pct,
                ..pullback_params()
            })
            .collect();

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = configs
                .iter()
                .map(|params| {
                    scope.spawn(move || run_backtest(pullback_bars(), params, &sample_config()))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });

        for (params, run) in configs.iter().zip(&results) {
            let sequential = run_backtest(pullback_bars(), params, &sample_config()).unwrap();
            assert_eq!(run.result, sequential.result);
        }
        assert_eq!(
            results[0].result.trades()[3].kind,
            TradeKind::StopLoss
        );
        assert_eq!(
            results[1].result.trades()[3].kind,
            TradeKind::SignalExit
        );
    }
}

mod csv_round_trip {
    use super::*;
    use sigtrader::ports::data_port::DataPort;
    use std::fmt::Write as _;
    use std::fs;
    use tempfile::TempDir;

    fn write_price_file(dir: &Path, ticker: &str, bars: &[PricePoint]) {
        let mut content = String::from("date,open,high,low,close,volume\n");
        for b in bars {
            writeln!(
                content,
                "{},{},{},{},{},{}",
                b.date, b.open, b.high, b.low, b.close, b.volume
            )
            .unwrap();
        }
        fs::write(dir.join(format!("{ticker}.csv")), content).unwrap();
    }

    #[test]
    fn csv_in_csv_out() {
        let dir = TempDir::new().unwrap();
        write_price_file(dir.path(), "TEST", &pullback_bars());

        let data_port = CsvAdapter::new(dir.path().to_path_buf());
        assert_eq!(
            data_port.get_data_range("TEST").unwrap(),
            Some((date(2024, 1, 1), date(2024, 2, 6), 37))
        );

        let stem = dir.path().join("reports").join("test");
        let run = run_backtest_pipeline(
            &data_port,
            &CsvReportAdapter::new(),
            &sample_config(),
            &pullback_params(),
            &stem,
        )
        .unwrap();
        assert_eq!(run.result.trades().len(), 4);

        let trades = fs::read_to_string(CsvReportAdapter::trades_path(&stem)).unwrap();
        let lines: Vec<&str> = trades.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "2024-01-16,BUY,122.5,163,19967.5");
        assert!(lines[2].starts_with("2024-01-18,"));
        assert!(lines[2].contains("SELL (signal)"));

        let series = fs::read_to_string(CsvReportAdapter::series_path(&stem)).unwrap();
        let lines: Vec<&str> = series.lines().collect();
        assert_eq!(lines.len(), 38);
        // dropped warm-up rows carry no signal
        assert!(lines[1].ends_with(','));
        assert!(lines[10].ends_with(",SELL"));
    }

    #[test]
    fn zero_trade_run_still_writes_trade_header() {
        let dir = TempDir::new().unwrap();
        let params = StrategyParams {
            short_window: 2,
            long_window: 5,
            momentum_window: 3,
            ..Default::default()
        };
        let run = run_backtest(
            generate_bars("2024-01-01", 30, 100.0, -1.0),
            &params,
            &sample_config(),
        )
        .unwrap();
        assert!(run.result.trades().is_empty());

        let stem = dir.path().join("declining");
        CsvReportAdapter::new().write(&run, &stem).unwrap();

        let trades = fs::read_to_string(CsvReportAdapter::trades_path(&stem)).unwrap();
        assert_eq!(trades.lines().collect::<Vec<_>>(), ["date,action,price,shares,value"]);
    }
}
