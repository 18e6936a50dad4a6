//! Cash, position, and equity tracking for one simulation run.

use chrono::NaiveDate;

use super::position::{ClosedTrade, Position, TradeRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    pub in_market: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: Position,
    pub trades: Vec<TradeRecord>,
    pub closed_trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            position: Position::Flat,
            trades: Vec::new(),
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn record_trade(&mut self, trade: TradeRecord) {
        self.trades.push(trade);
    }

    pub fn record_closed(&mut self, trade: ClosedTrade) {
        self.closed_trades.push(trade);
    }

    /// Marks the portfolio to `price` and appends the result to the curve.
    pub fn record_equity(&mut self, date: NaiveDate, price: f64) {
        let equity = self.total_equity(price);
        self.equity_curve.push(EquityPoint {
            date,
            equity,
            in_market: self.position.is_long(),
        });
    }

    /// Cash plus any open lot marked at `price`; the lot is not closed.
    pub fn total_equity(&self, price: f64) -> f64 {
        self.cash + self.position.market_value(price)
    }
}
