//! Run accounting — equity/drawdown tracking and aggregate metrics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::TradeRecord;

/// Running equity scalar with peak and max-drawdown tracking.
///
/// Updated once per resolved trade; open trades are never marked to market,
/// so the walk only moves on completions.
#[derive(Debug, Clone, Default)]
pub struct EquityTracker {
    equity: f64,
    peak: f64,
    max_drawdown: f64,
}

impl EquityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_trade_close(&mut self, pnl: f64) {
        self.equity += pnl;
        if self.equity > self.peak {
            self.peak = self.equity;
        }
        if self.peak > 0.0 {
            let drawdown = (self.peak - self.equity) / self.peak.abs().max(1e-12);
            if drawdown > self.max_drawdown {
                self.max_drawdown = drawdown;
            }
        }
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    /// Largest fractional decline from the running peak seen so far.
    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }
}

/// Aggregate metrics for one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub trades: usize,
    pub wins: usize,
    pub total_pnl: f64,
    pub pnl_by_origin: BTreeMap<String, f64>,
    pub max_drawdown: f64,
    pub hold_secs_sum: i64,
}

impl RunMetrics {
    /// Fold a resolved trade into the aggregates.
    ///
    /// Drawdown is tracked separately by [`EquityTracker`]; the simulator
    /// stamps it on at the end of the run.
    pub fn record(&mut self, trade: &TradeRecord) {
        self.trades += 1;
        if trade.is_winner() {
            self.wins += 1;
        }
        self.total_pnl += trade.pnl;
        *self
            .pnl_by_origin
            .entry(trade.origin.clone())
            .or_insert(0.0) += trade.pnl;
        self.hold_secs_sum += trade.hold_secs();
    }

    /// wins / trades; 0 when no trades resolved.
    pub fn winrate(&self) -> f64 {
        if self.trades == 0 {
            return 0.0;
        }
        self.wins as f64 / self.trades as f64
    }

    /// Mean hold duration in seconds; 0 when no trades resolved.
    pub fn avg_hold_secs(&self) -> f64 {
        if self.trades == 0 {
            return 0.0;
        }
        self.hold_secs_sum as f64 / self.trades as f64
    }
}
