//! Trade execution and fill simulation.
//!
//! Every fill happens immediately at the bar's close. There are no
//! commissions, slippage, or partial shares.

use chrono::NaiveDate;
use log::debug;

use super::portfolio::Portfolio;
use super::position::{ClosedTrade, Position, TradeKind, TradeRecord};
use super::strategy::StrategyParams;

/// Result of an entry attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryResult {
    Entered { shares: u64, price: f64, cost: f64 },
    /// Sizing produced zero shares; nothing changed.
    InsufficientCapital,
    AlreadyLong,
}

/// Enter a long position.
///
/// 1. Trade capital = cash * position_size_pct / 100
/// 2. Shares = floor(trade capital / price)
/// 3. If shares == 0, return InsufficientCapital
/// 4. Deduct shares * price from cash, open the position, log the entry
pub fn enter_long(
    portfolio: &mut Portfolio,
    date: NaiveDate,
    price: f64,
    params: &StrategyParams,
) -> EntryResult {
    if portfolio.position.is_long() {
        return EntryResult::AlreadyLong;
    }

    let trade_capital = portfolio.cash * params.position_size_pct / 100.0;
    // Saturating cast: NaN or negative quotients become 0.
    let shares = (trade_capital / price).floor() as u64;

    if shares == 0 {
        debug!(
            "{date}: buy skipped, {trade_capital:.2} does not cover one share at {price:.2}"
        );
        return EntryResult::InsufficientCapital;
    }

    let cost = shares as f64 * price;
    portfolio.cash -= cost;
    portfolio.position = Position::Long {
        entry_price: price,
        entry_date: date,
        shares,
    };
    portfolio.record_trade(TradeRecord {
        kind: TradeKind::Entry,
        date,
        price,
        shares,
    });
    debug!("{date}: bought {shares} @ {price:.2}, cash {:.2}", portfolio.cash);

    EntryResult::Entered {
        shares,
        price,
        cost,
    }
}

/// Close the open position at `price`, logging it as `kind`.
///
/// Returns `None` when flat.
pub fn exit_position(
    portfolio: &mut Portfolio,
    date: NaiveDate,
    price: f64,
    kind: TradeKind,
) -> Option<ClosedTrade> {
    let Position::Long {
        entry_price,
        entry_date,
        shares,
    } = portfolio.position
    else {
        return None;
    };

    let proceeds = shares as f64 * price;
    portfolio.cash += proceeds;
    portfolio.position = Position::Flat;
    portfolio.record_trade(TradeRecord {
        kind,
        date,
        price,
        shares,
    });

    let closed = ClosedTrade {
        shares,
        entry_price,
        exit_price: price,
        entry_date,
        exit_date: date,
        exit_kind: kind,
        pnl: shares as f64 * (price - entry_price),
    };
    portfolio.record_closed(closed);
    debug!("{date}: {kind} {shares} @ {price:.2}, pnl {:.2}", closed.pnl);

    Some(closed)
}

/// First exit rule that fires for the open position: stop-loss, then
/// take-profit, then a sell signal. `None` when flat or nothing fires.
pub fn check_exit(
    position: &Position,
    price: f64,
    sell_signal: bool,
    params: &StrategyParams,
) -> Option<TradeKind> {
    if !position.is_long() {
        return None;
    }
    if position.should_stop_loss(price, params.stop_loss_pct) {
        Some(TradeKind::StopLoss)
    } else if position.should_take_profit(price, params.take_profit_pct) {
        Some(TradeKind::TakeProfit)
    } else if sell_signal {
        Some(TradeKind::SignalExit)
    } else {
        None
    }
}
