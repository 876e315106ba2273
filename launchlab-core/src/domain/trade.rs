//! TradeRecord — a resolved round-trip, folded into run metrics immediately.

use serde::{Deserialize, Serialize};

/// Why a trade left the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    /// Held past the maximum hold duration.
    MaxHold,
    /// Quote stream ended before any exit condition fired.
    EndOfData,
}

/// A completed round-trip for one mint.
///
/// Records are ephemeral: the simulator folds each one into the run
/// aggregates as soon as it resolves and does not retain them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub mint: String,
    pub entry_ts: i64,
    pub entry_price: f64,
    pub exit_ts: i64,
    pub exit_price: f64,
    /// Notional in SOL.
    pub size: f64,
    pub pnl: f64,
    /// Origin tag of the snapshot that fired the entry.
    pub origin: String,
    pub exit_reason: ExitReason,
}

impl TradeRecord {
    pub fn hold_secs(&self) -> i64 {
        (self.exit_ts - self.entry_ts).max(0)
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}
