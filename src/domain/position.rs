//! Position state and trade log records.

use chrono::NaiveDate;
use std::fmt;

/// The simulator's holding: nothing, or a single long lot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    #[default]
    Flat,
    Long {
        entry_price: f64,
        entry_date: NaiveDate,
        /// Always > 0.
        shares: u64,
    },
}

impl Position {
    pub fn is_long(&self) -> bool {
        matches!(self, Position::Long { .. })
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }

    pub fn shares(&self) -> u64 {
        match self {
            Position::Flat => 0,
            Position::Long { shares, .. } => *shares,
        }
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares() as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long {
                entry_price,
                shares,
                ..
            } => *shares as f64 * (price - entry_price),
        }
    }

    /// `price <= entry * (1 - stop_loss_pct / 100)`; never true when flat.
    pub fn should_stop_loss(&self, price: f64, stop_loss_pct: f64) -> bool {
        match self {
            Position::Flat => false,
            Position::Long { entry_price, .. } => {
                price <= entry_price * (1.0 - stop_loss_pct / 100.0)
            }
        }
    }

    /// `price >= entry * (1 + take_profit_pct / 100)`; never true when flat.
    pub fn should_take_profit(&self, price: f64, take_profit_pct: f64) -> bool {
        match self {
            Position::Flat => false,
            Position::Long { entry_price, .. } => {
                price >= entry_price * (1.0 + take_profit_pct / 100.0)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeKind {
    Entry,
    StopLoss,
    TakeProfit,
    SignalExit,
}

impl TradeKind {
    pub fn label(&self) -> &'static str {
        match self {
            TradeKind::Entry => "BUY",
            TradeKind::StopLoss => "SELL (stop-loss)",
            TradeKind::TakeProfit => "SELL (take-profit)",
            TradeKind::SignalExit => "SELL (signal)",
        }
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One fill in the trade log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeRecord {
    pub kind: TradeKind,
    pub date: NaiveDate,
    pub price: f64,
    pub shares: u64,
}

/// An entry paired with the exit that closed it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedTrade {
    pub shares: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub exit_kind: TradeKind,
    pub pnl: f64,
}

impl ClosedTrade {
    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}
