//! Snapshot — a point-in-time launch-activity observation.

use serde::{Deserialize, Serialize};

/// Market-activity observation for a single mint at a single moment.
///
/// Snapshots are produced by the recorder and arrive ordered by timestamp
/// within each mint. `same` counts buyers sharing one funding wallet and
/// cannot meaningfully exceed `buyers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub mint: String,
    /// Unix seconds.
    pub ts: i64,
    pub buyers: u32,
    /// Distinct funding wallets among the buyers.
    pub unique: u32,
    /// Buyers funded from a single wallet.
    pub same: u32,
    pub price_jumps: u32,
    /// Order-book depth estimate (quote levels).
    pub depth: f64,
    /// Venue the mint launched on (e.g. "pumpfun").
    pub origin: String,
}

impl Snapshot {
    /// Fraction of buyers sharing one funding wallet, capped at 1.0.
    ///
    /// Zero buyers uses a denominator of one so a nonzero `same` still
    /// registers.
    pub fn same_funder_ratio(&self) -> f64 {
        let denom = self.buyers.max(1) as f64;
        (self.same as f64 / denom).min(1.0)
    }
}
