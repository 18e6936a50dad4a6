//! Strategy parameters: indicator windows, sizing, and exit thresholds.

use crate::domain::error::SigtraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub short_window: usize,
    pub long_window: usize,
    pub momentum_window: usize,
    /// Percentage of available cash committed per entry, in (0, 100].
    pub position_size_pct: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            short_window: 50,
            long_window: 200,
            momentum_window: 14,
            position_size_pct: 20.0,
            stop_loss_pct: 5.0,
            take_profit_pct: 10.0,
        }
    }
}

impl StrategyParams {
    /// Rejects parameters the simulator cannot run with. `short_window`
    /// at or above `long_window` is allowed.
    pub fn validate(&self) -> Result<(), SigtraderError> {
        let windows = [
            ("short_window", self.short_window),
            ("long_window", self.long_window),
            ("momentum_window", self.momentum_window),
        ];
        for (name, window) in windows {
            if window == 0 {
                return Err(SigtraderError::InvalidConfiguration {
                    reason: format!("{name} must be a positive integer"),
                });
            }
        }

        if !(self.position_size_pct > 0.0 && self.position_size_pct <= 100.0) {
            return Err(SigtraderError::InvalidConfiguration {
                reason: format!(
                    "position_size_pct must be in (0, 100], got {}",
                    self.position_size_pct
                ),
            });
        }
        if !(self.stop_loss_pct > 0.0) {
            return Err(SigtraderError::InvalidConfiguration {
                reason: format!("stop_loss_pct must be positive, got {}", self.stop_loss_pct),
            });
        }
        if !(self.take_profit_pct > 0.0) {
            return Err(SigtraderError::InvalidConfiguration {
                reason: format!(
                    "take_profit_pct must be positive, got {}",
                    self.take_profit_pct
                ),
            });
        }
        Ok(())
    }

    /// Bars needed before every indicator can be defined.
    pub fn min_bars(&self) -> usize {
        self.short_window
            .max(self.long_window)
            .max(self.momentum_window)
    }
}
