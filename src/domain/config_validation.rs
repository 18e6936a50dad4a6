//! Configuration validation.
//!
//! Validates all config fields before a backtest runs. Keys that are absent
//! fall back to defaults when the run is built; keys that are present must
//! parse and be in range.

use crate::domain::error::SigtraderError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use log::warn;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_ticker(config)?;
    validate_dates(config)?;
    validate_initial_capital(config)?;
    validate_risk_free_rate(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_windows(config)?;
    validate_position_size(config)?;
    validate_threshold(config, "stop_loss_pct")?;
    validate_threshold(config, "take_profit_pct")?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SigtraderError {
    SigtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// `Ok(None)` when the key is absent, an error when it is present but does
/// not parse as `T`.
pub fn parse_value<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, SigtraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("cannot parse '{}'", raw.trim()))),
    }
}

pub fn parse_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, SigtraderError> {
    let raw = config
        .get_string(section, key)
        .ok_or_else(|| SigtraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })?;
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| invalid(section, key, "invalid date format (expected YYYY-MM-DD)"))
}

fn validate_ticker(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    match config.get_string("backtest", "ticker") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SigtraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: "ticker".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let start_date = parse_date(config, "backtest", "start_date")?;
    let end_date = parse_date(config, "backtest", "end_date")?;

    if start_date >= end_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    if let Some(value) = parse_value::<f64>(config, "backtest", "initial_capital")? {
        if !(value > 0.0) || !value.is_finite() {
            return Err(invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    if let Some(value) = parse_value::<f64>(config, "backtest", "risk_free_rate")? {
        if !(0.0..1.0).contains(&value) {
            return Err(invalid(
                "backtest",
                "risk_free_rate",
                "risk_free_rate must be between 0 and 1",
            ));
        }
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let mut parsed = [None; 3];
    for (slot, key) in parsed
        .iter_mut()
        .zip(["short_window", "long_window", "momentum_window"])
    {
        let value = parse_value::<usize>(config, "strategy", key)
            .map_err(|_| invalid("strategy", key, format!("{key} must be a positive integer")))?;
        if value == Some(0) {
            return Err(invalid(
                "strategy",
                key,
                format!("{key} must be a positive integer"),
            ));
        }
        *slot = value;
    }

    if let [Some(short), Some(long), _] = parsed {
        if short >= long {
            warn!("short_window ({short}) is not below long_window ({long})");
        }
    }
    Ok(())
}

fn validate_position_size(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    if let Some(value) = parse_value::<f64>(config, "strategy", "position_size_pct")? {
        if !(value > 0.0 && value <= 100.0) {
            return Err(invalid(
                "strategy",
                "position_size_pct",
                "position_size_pct must be in (0, 100]",
            ));
        }
    }
    Ok(())
}

fn validate_threshold(config: &dyn ConfigPort, key: &str) -> Result<(), SigtraderError> {
    if let Some(value) = parse_value::<f64>(config, "strategy", key)? {
        if !(value > 0.0) || !value.is_finite() {
            return Err(invalid("strategy", key, format!("{key} must be positive")));
        }
    }
    Ok(())
}
