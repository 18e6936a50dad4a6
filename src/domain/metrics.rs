//! Risk and trade statistics derived from the equity curve and round trips.

use super::portfolio::{EquityPoint, Portfolio};
use super::position::ClosedTrade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub max_drawdown: f64,
    /// Longest stretch of rows spent below a prior equity peak.
    pub max_drawdown_duration: usize,
    pub sharpe_ratio: f64,
    /// Fraction of rows with an open position.
    pub exposure: f64,
    pub round_trips: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_holding_days: f64,
}

impl Metrics {
    pub fn compute(portfolio: &Portfolio, risk_free_rate: f64) -> Self {
        let curve = &portfolio.equity_curve;
        let (max_drawdown, max_drawdown_duration) = drawdown(curve);

        let exposure = if curve.is_empty() {
            0.0
        } else {
            curve.iter().filter(|p| p.in_market).count() as f64 / curve.len() as f64
        };

        let trades = TradeStats::from_trades(&portfolio.closed_trades);

        Metrics {
            max_drawdown,
            max_drawdown_duration,
            sharpe_ratio: sharpe(curve, risk_free_rate / TRADING_DAYS_PER_YEAR),
            exposure,
            round_trips: portfolio.closed_trades.len(),
            trades_won: trades.won,
            trades_lost: trades.lost,
            win_rate: trades.win_rate(),
            profit_factor: trades.profit_factor(),
            avg_holding_days: trades.avg_holding_days(),
        }
    }
}

#[derive(Default)]
struct TradeStats {
    won: usize,
    lost: usize,
    count: usize,
    gross_win: f64,
    gross_loss: f64,
    holding_days: i64,
}

impl TradeStats {
    fn from_trades(trades: &[ClosedTrade]) -> Self {
        trades.iter().fold(TradeStats::default(), |mut acc, t| {
            acc.count += 1;
            acc.holding_days += t.holding_days();
            if t.pnl > 0.0 {
                acc.won += 1;
                acc.gross_win += t.pnl;
            } else if t.pnl < 0.0 {
                acc.lost += 1;
                acc.gross_loss += -t.pnl;
            }
            acc
        })
    }

    fn win_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.won as f64 / self.count as f64
        }
    }

    fn profit_factor(&self) -> f64 {
        if self.gross_loss > 0.0 {
            self.gross_win / self.gross_loss
        } else if self.gross_win > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }

    fn avg_holding_days(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.holding_days as f64 / self.count as f64
        }
    }
}

/// (max drawdown as a fraction of the peak, longest underwater run in rows)
fn drawdown(curve: &[EquityPoint]) -> (f64, usize) {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    let mut run = 0usize;
    let mut longest = 0usize;

    for point in curve {
        if point.equity >= peak {
            peak = point.equity;
            run = 0;
            continue;
        }
        run += 1;
        longest = longest.max(run);
        if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
        }
    }

    (max_dd, longest)
}

/// Annualised Sharpe ratio of row-to-row equity returns.
fn sharpe(curve: &[EquityPoint], daily_rf: f64) -> f64 {
    let returns: Vec<f64> = curve
        .windows(2)
        .filter(|w| w[0].equity > 0.0)
        .map(|w| (w[1].equity - w[0].equity) / w[0].equity)
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        (mean - daily_rf) / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
