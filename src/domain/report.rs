//! Summary figures for a finished run, against a buy-and-hold baseline.

use std::fmt;

use crate::domain::backtest::SimulationResult;
use crate::domain::error::SigtraderError;
use crate::domain::signal::SignalRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Profit,
    Loss,
    Breakeven,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Profit => write!(f, "PROFIT"),
            Outcome::Loss => write!(f, "LOSS"),
            Outcome::Breakeven => write!(f, "BREAKEVEN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub initial_capital: f64,
    pub first_price: f64,
    pub last_price: f64,
    pub final_value: f64,
    pub strategy_return_pct: f64,
    pub buy_hold_shares: u64,
    pub buy_hold_final: f64,
    pub buy_hold_return_pct: f64,
    pub profit_loss_amount: f64,
    pub outcome: Outcome,
}

impl PerformanceReport {
    /// Values the simulation at `last_price`, marking any open lot without
    /// closing it, and buys `floor(capital / first_price)` shares for the
    /// baseline.
    pub fn compute(
        result: &SimulationResult,
        first_price: f64,
        last_price: f64,
        initial_capital: f64,
    ) -> Result<Self, SigtraderError> {
        if !(initial_capital > 0.0) {
            return Err(SigtraderError::InvalidConfiguration {
                reason: format!("initial capital must be positive, got {initial_capital}"),
            });
        }
        if !(first_price > 0.0) || !(last_price > 0.0) {
            return Err(SigtraderError::InvalidConfiguration {
                reason: format!(
                    "reference prices must be positive, got {first_price} and {last_price}"
                ),
            });
        }

        let final_value = result.final_cash() + result.final_position().market_value(last_price);
        let profit_loss_amount = final_value - initial_capital;

        let buy_hold_shares = (initial_capital / first_price).floor() as u64;
        let buy_hold_final = buy_hold_shares as f64 * last_price;

        let outcome = if profit_loss_amount > 0.0 {
            Outcome::Profit
        } else if profit_loss_amount < 0.0 {
            Outcome::Loss
        } else {
            Outcome::Breakeven
        };

        Ok(PerformanceReport {
            initial_capital,
            first_price,
            last_price,
            final_value,
            strategy_return_pct: pct_change(final_value, initial_capital),
            buy_hold_shares,
            buy_hold_final,
            buy_hold_return_pct: pct_change(buy_hold_final, initial_capital),
            profit_loss_amount,
            outcome,
        })
    }

    /// Takes the first and last prices from the retained rows.
    pub fn from_rows(
        result: &SimulationResult,
        rows: &[SignalRow],
        initial_capital: f64,
        ticker: &str,
    ) -> Result<Self, SigtraderError> {
        match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => {
                Self::compute(result, first.close, last.close, initial_capital)
            }
            _ => Err(SigtraderError::NoData {
                ticker: ticker.to_string(),
            }),
        }
    }

    pub fn outperformed_buy_hold(&self) -> bool {
        self.final_value > self.buy_hold_final
    }
}

fn pct_change(value: f64, base: f64) -> f64 {
    (value - base) / base * 100.0
}
