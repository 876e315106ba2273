//! Trade simulator — replays snapshot streams against quote streams.
//!
//! One pass per mint: decide while flat, match a fired decision to the
//! chosen size tier's quote stream, resolve the exit, fold the trade into
//! the run aggregates. Fired-but-unmatchable signals are dropped, not
//! retried.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::accounting::{EquityTracker, RunMetrics};
use super::decision::{decide, Entry, TradeState};
use crate::domain::trade::ExitReason;
use crate::domain::{Mint, Params, Quote, QuoteBook, SizeKey, Snapshot, TradeRecord};

/// Fixed execution settings shared by every run in a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeSettings {
    /// Take-profit threshold as a fractional return.
    pub take_profit: f64,
    /// Stop-loss threshold as a positive fraction.
    pub stop_loss: f64,
    /// Time exit after this many seconds in the market.
    pub max_hold_secs: i64,
    /// SOL notional for Small entries.
    pub size_small: f64,
    /// SOL notional for Apex entries.
    pub size_large: f64,
}

impl Default for TradeSettings {
    fn default() -> Self {
        Self {
            take_profit: 0.35,
            stop_loss: 0.25,
            max_hold_secs: 900,
            size_small: 0.1,
            size_large: 0.4,
        }
    }
}

impl TradeSettings {
    /// The two size tiers the simulator will request quotes for.
    pub fn size_tiers(&self) -> [f64; 2] {
        [self.size_small, self.size_large]
    }
}

/// Simulate every mint's snapshot stream under one parameter set.
///
/// Mints are visited in key order so the shared equity walk — and with it
/// `max_drawdown` — is deterministic for a given dataset.
pub fn run_simulation(
    events_by_mint: &BTreeMap<Mint, Vec<Snapshot>>,
    quotes: &QuoteBook,
    params: &Params,
    settings: &TradeSettings,
) -> RunMetrics {
    let mut metrics = RunMetrics::default();
    let mut equity = EquityTracker::new();
    let cooldown_secs = params.cooldown_secs();

    for (mint, snapshots) in events_by_mint {
        // Mints the quoter never covered cannot trade at all.
        if !quotes.has_mint(mint) {
            continue;
        }

        let mut state = TradeState::flat();

        for snapshot in snapshots {
            let Some(entry) = decide(&state, snapshot, params) else {
                continue;
            };

            let size = match entry {
                Entry::Small => settings.size_small,
                Entry::Apex => settings.size_large,
            };
            let Some(stream) = quotes.stream(mint, SizeKey::from_sol(size)) else {
                continue;
            };

            let Some(trade) = resolve_trade(stream, snapshot, size, settings) else {
                continue;
            };

            metrics.record(&trade);
            equity.on_trade_close(trade.pnl);

            // The trade resolved synchronously, so the state never observes
            // an open position; only the cooldown carries forward.
            state.in_position = false;
            state.cooldown_until = trade.exit_ts + cooldown_secs;
        }
    }

    metrics.max_drawdown = equity.max_drawdown();
    metrics
}

/// Match a fired signal to an entry and exit quote.
///
/// `None` drops the signal: no trade, no state change, no cooldown.
fn resolve_trade(
    stream: &[Quote],
    snapshot: &Snapshot,
    size: f64,
    settings: &TradeSettings,
) -> Option<TradeRecord> {
    let entry_idx = latest_at_or_before(stream, snapshot.ts)?;
    let entry = &stream[entry_idx];
    if entry.price <= 0.0 {
        return None;
    }

    let (exit_idx, exit_reason) = find_exit(stream, entry_idx, entry.ts, entry.price, settings)?;
    let exit = &stream[exit_idx];
    // A dead fallback quote closes the trade flat at the entry price.
    let exit_price = if exit.price > 0.0 { exit.price } else { entry.price };

    let pnl = size * (exit_price / entry.price - 1.0);

    Some(TradeRecord {
        mint: snapshot.mint.clone(),
        entry_ts: entry.ts,
        entry_price: entry.price,
        exit_ts: exit.ts,
        exit_price,
        size,
        pnl,
        origin: snapshot.origin.clone(),
        exit_reason,
    })
}

/// Index of the most recent quote with `ts <= at`.
fn latest_at_or_before(stream: &[Quote], at: i64) -> Option<usize> {
    stream.partition_point(|q| q.ts <= at).checked_sub(1)
}

/// Scan forward from the entry quote for the first exit condition.
///
/// Dead quotes (price <= 0) are skipped without consuming a slot. The time
/// exit is checked before the price exits, so a quote past the deadline
/// closes the trade even if it would also clear take-profit. When nothing
/// fires, the trade closes on the last quote at/after entry time.
fn find_exit(
    stream: &[Quote],
    entry_idx: usize,
    entry_ts: i64,
    entry_price: f64,
    settings: &TradeSettings,
) -> Option<(usize, ExitReason)> {
    for (idx, quote) in stream.iter().enumerate().skip(entry_idx) {
        if quote.price <= 0.0 {
            continue;
        }
        if quote.ts - entry_ts >= settings.max_hold_secs {
            return Some((idx, ExitReason::MaxHold));
        }
        let ret = quote.price / entry_price - 1.0;
        if ret >= settings.take_profit {
            return Some((idx, ExitReason::TakeProfit));
        }
        if ret <= -settings.stop_loss {
            return Some((idx, ExitReason::StopLoss));
        }
    }

    stream
        .iter()
        .rposition(|q| q.ts >= entry_ts)
        .map(|idx| (idx, ExitReason::EndOfData))
}
