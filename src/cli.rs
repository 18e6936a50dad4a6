//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestRun};
use crate::domain::config_validation::{
    parse_date, parse_value, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::SigtraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::report::PerformanceReport;
use crate::domain::signal::Signal;
use crate::domain::strategy::StrategyParams;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_CAPITAL: f64 = 100_000.0;
const DEFAULT_OUTPUT: &str = "report";

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "Moving-average and momentum strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        /// First date to load (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Last date to load (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        capital: Option<f64>,
        /// Output path stem; `_trades.csv` and `_series.csv` are appended
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List tickers with price files in a directory
    ListSymbols {
        #[arg(long)]
        data_dir: PathBuf,
    },
    /// Show data range for a ticker
    Info {
        #[arg(long)]
        ticker: String,
        #[arg(long)]
        data_dir: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub ticker: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub capital: Option<f64>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            ticker,
            start,
            end,
            capital,
            output,
            dry_run,
        } => {
            let overrides = Overrides {
                ticker,
                start,
                end,
                capital,
            };
            if dry_run {
                run_dry_run(&config, &overrides)
            } else {
                run_backtest(&config, &overrides, output.as_deref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { data_dir } => run_list_symbols(&data_dir),
        Command::Info { ticker, data_dir } => run_info(&ticker, &data_dir),
    }
}

fn fail(e: &SigtraderError) -> ExitCode {
    error!("{e}");
    e.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        fail(&SigtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    })
}

pub fn apply_overrides(adapter: &mut FileConfigAdapter, overrides: &Overrides) {
    if let Some(ticker) = &overrides.ticker {
        adapter.set_override("backtest", "ticker", ticker.trim());
    }
    if let Some(start) = &overrides.start {
        adapter.set_override("backtest", "start_date", start.trim());
    }
    if let Some(end) = &overrides.end {
        adapter.set_override("backtest", "end_date", end.trim());
    }
    if let Some(capital) = overrides.capital {
        adapter.set_override("backtest", "initial_capital", capital.to_string());
    }
}

/// Loads the file, applies overrides, and runs both validators.
fn load_validated(path: &Path, overrides: &Overrides) -> Result<FileConfigAdapter, ExitCode> {
    info!("Loading config from {}", path.display());
    let mut adapter = load_config(path)?;
    apply_overrides(&mut adapter, overrides);

    validate_backtest_config(&adapter).map_err(|e| fail(&e))?;
    validate_strategy_config(&adapter).map_err(|e| fail(&e))?;
    Ok(adapter)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, SigtraderError> {
    let ticker = adapter
        .get_string("backtest", "ticker")
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SigtraderError::ConfigMissing {
            section: "backtest".into(),
            key: "ticker".into(),
        })?;

    Ok(BacktestConfig {
        ticker,
        start_date: parse_date(adapter, "backtest", "start_date")?,
        end_date: parse_date(adapter, "backtest", "end_date")?,
        initial_capital: parse_value(adapter, "backtest", "initial_capital")?
            .unwrap_or(DEFAULT_CAPITAL),
        risk_free_rate: parse_value(adapter, "backtest", "risk_free_rate")?.unwrap_or(0.0),
    })
}

pub fn build_strategy_params(adapter: &dyn ConfigPort) -> Result<StrategyParams, SigtraderError> {
    let defaults = StrategyParams::default();
    Ok(StrategyParams {
        short_window: parse_value(adapter, "strategy", "short_window")?
            .unwrap_or(defaults.short_window),
        long_window: parse_value(adapter, "strategy", "long_window")?
            .unwrap_or(defaults.long_window),
        momentum_window: parse_value(adapter, "strategy", "momentum_window")?
            .unwrap_or(defaults.momentum_window),
        position_size_pct: parse_value(adapter, "strategy", "position_size_pct")?
            .unwrap_or(defaults.position_size_pct),
        stop_loss_pct: parse_value(adapter, "strategy", "stop_loss_pct")?
            .unwrap_or(defaults.stop_loss_pct),
        take_profit_pct: parse_value(adapter, "strategy", "take_profit_pct")?
            .unwrap_or(defaults.take_profit_pct),
    })
}

pub fn data_directory(adapter: &dyn ConfigPort) -> PathBuf {
    adapter
        .get_string("data", "directory")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// The `--output` flag wins over `[report] output`.
pub fn resolve_output(adapter: &dyn ConfigPort, flag: Option<&Path>) -> PathBuf {
    match flag {
        Some(path) => path.to_path_buf(),
        None => adapter
            .get_string("report", "output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
    }
}

fn run_backtest(config_path: &Path, overrides: &Overrides, output: Option<&Path>) -> ExitCode {
    let adapter = match load_validated(config_path, overrides) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (bt_config, params) = match build_backtest_config(&adapter)
        .and_then(|c| build_strategy_params(&adapter).map(|p| (c, p)))
    {
        Ok(pair) => pair,
        Err(e) => return fail(&e),
    };

    let data_port = CsvAdapter::new(data_directory(&adapter));
    let output = resolve_output(&adapter, output);

    match run_backtest_pipeline(&data_port, &CsvReportAdapter::new(), &bt_config, &params, &output)
    {
        Ok(run) => {
            print_summary(&run);
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.is_no_data() {
                println!("No data available for {}", bt_config.ticker);
            }
            fail(&e)
        }
    }
}

/// Fetch, simulate, and write outputs for one ticker.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    bt_config: &BacktestConfig,
    params: &StrategyParams,
    output: &Path,
) -> Result<BacktestRun, SigtraderError> {
    info!(
        "Fetching {} from {} to {}",
        bt_config.ticker, bt_config.start_date, bt_config.end_date
    );
    let bars = data_port.fetch_prices(&bt_config.ticker, bt_config.start_date, bt_config.end_date)?;

    info!(
        "Running backtest: {} / {}, {}",
        IndicatorType::Sma(params.short_window),
        IndicatorType::Sma(params.long_window),
        IndicatorType::Momentum(params.momentum_window)
    );
    let run = backtest_engine::run_backtest(bars, params, bt_config)?;

    for path in report_port.write(&run, output)? {
        info!("Report written to: {}", path.display());
    }
    Ok(run)
}

pub fn print_summary(run: &BacktestRun) {
    let report = &run.report;
    let metrics = &run.metrics;

    println!("=== {} ===", run.config.ticker);
    println!(
        "Period:           {} to {} ({} rows)",
        run.rows.first().map(|r| r.date).unwrap_or(run.config.start_date),
        run.rows.last().map(|r| r.date).unwrap_or(run.config.end_date),
        run.rows.len()
    );
    println!(
        "Signals:          {} buy, {} sell, {} hold",
        run.signal_count(Signal::Buy),
        run.signal_count(Signal::Sell),
        run.signal_count(Signal::Hold)
    );
    println!("Initial Capital:  {:.2}", report.initial_capital);
    println!("Final Value:      {:.2}", report.final_value);
    println!("Strategy Return:  {:.2}%", report.strategy_return_pct);
    println!("Buy & Hold:       {:.2}%", report.buy_hold_return_pct);
    println!("                  {}", benchmark_verdict(report));
    println!(
        "{:<18}{:.2}",
        format!("{}:", report.outcome),
        report.profit_loss_amount.abs()
    );
    println!("Trades:           {}", run.result.trades().len());
    if run.result.skipped_entries > 0 {
        println!("Skipped Entries:  {}", run.result.skipped_entries);
    }
    println!("Max Drawdown:     {}", format_drawdown(metrics.max_drawdown));
    println!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    println!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);

    if !run.result.trades().is_empty() {
        println!("\n=== Trade Log ===");
        for trade in run.result.trades() {
            println!(
                "  {}  {:<20} {:>8} @ {:.2}",
                trade.date,
                trade.kind.label(),
                trade.shares,
                trade.price
            );
        }
    }

    let position = run.result.final_position();
    if position.is_long() {
        warn!(
            "{} shares still open at end of data, unrealized {:.2}",
            position.shares(),
            position.unrealized_pnl(report.last_price)
        );
    }
}

pub fn benchmark_verdict(report: &PerformanceReport) -> &'static str {
    if report.outperformed_buy_hold() {
        "beat buy & hold"
    } else {
        "lagged buy & hold"
    }
}

/// `max_drawdown` is a fraction; no sign when there was no drawdown.
pub fn format_drawdown(max_drawdown: f64) -> String {
    if max_drawdown > 0.0 {
        format!("-{:.1}%", max_drawdown * 100.0)
    } else {
        "0.0%".to_string()
    }
}

pub fn run_dry_run(config_path: &Path, overrides: &Overrides) -> ExitCode {
    let adapter = match load_validated(config_path, overrides) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (bt_config, params) = match build_backtest_config(&adapter)
        .and_then(|c| build_strategy_params(&adapter).map(|p| (c, p)))
    {
        Ok(pair) => pair,
        Err(e) => return fail(&e),
    };
    if let Err(e) = bt_config.validate().and_then(|_| params.validate()) {
        return fail(&e);
    }

    println!("Backtest:");
    println!("  ticker:            {}", bt_config.ticker);
    println!(
        "  range:             {} to {}",
        bt_config.start_date, bt_config.end_date
    );
    println!("  initial_capital:   {:.2}", bt_config.initial_capital);
    println!("  risk_free_rate:    {}", bt_config.risk_free_rate);
    println!("\nStrategy:");
    println!("  short_window:      {}", params.short_window);
    println!("  long_window:       {}", params.long_window);
    println!("  momentum_window:   {}", params.momentum_window);
    println!("  position_size_pct: {}", params.position_size_pct);
    println!("  stop_loss_pct:     {}", params.stop_loss_pct);
    println!("  take_profit_pct:   {}", params.take_profit_pct);
    println!("\nData directory:      {}", data_directory(&adapter).display());
    println!(
        "Output stem:         {}",
        resolve_output(&adapter, None).display()
    );

    info!("Dry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_validated(config_path, &Overrides::default()) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let checked = build_backtest_config(&adapter)
        .and_then(|c| c.validate())
        .and_then(|_| build_strategy_params(&adapter))
        .and_then(|p| p.validate());
    if let Err(e) = checked {
        return fail(&e);
    }

    println!("Configuration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(data_dir: &Path) -> ExitCode {
    let adapter = CsvAdapter::new(data_dir.to_path_buf());
    let tickers = match adapter.list_tickers() {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };

    if tickers.is_empty() {
        info!("No symbols found in {}", data_dir.display());
    } else {
        for ticker in &tickers {
            println!("{}", ticker);
        }
        info!("{} symbols found", tickers.len());
    }
    ExitCode::SUCCESS
}

fn run_info(ticker: &str, data_dir: &Path) -> ExitCode {
    let adapter = CsvAdapter::new(data_dir.to_path_buf());
    let ticker = ticker.trim().to_uppercase();

    match adapter.get_data_range(&ticker) {
        Ok(Some((first, last, count))) => {
            println!("{}: {} bars, {} to {}", ticker, count, first, last);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("{}: no data found", ticker);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
