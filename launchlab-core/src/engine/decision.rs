//! Decision state machine — flat/cooldown gating over the scorer.

use serde::{Deserialize, Serialize};

use super::scorer::{conviction, safety_gate};
use crate::domain::{Params, Snapshot};

/// Entry size class fired by a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entry {
    Small,
    Apex,
}

/// Per-mint decision state.
///
/// Created flat at the start of a mint's replay; only the simulator mutates
/// it, after a trade resolves; discarded at end of replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradeState {
    pub in_position: bool,
    /// No re-entry before this timestamp.
    pub cooldown_until: i64,
}

impl TradeState {
    pub fn flat() -> Self {
        Self::default()
    }
}

/// Decide whether a snapshot fires an entry, and at which size.
///
/// Apex demands both a boosted score and independently stronger raw
/// evidence (buyers strictly above the observation threshold, unique
/// funders at it) — score alone never qualifies.
pub fn decide(state: &TradeState, snapshot: &Snapshot, params: &Params) -> Option<Entry> {
    if state.in_position {
        return None;
    }
    if snapshot.ts < state.cooldown_until {
        return None;
    }
    if !safety_gate(snapshot, params) {
        return None;
    }

    let score = conviction(snapshot, params);
    let entry_min = params.entry_min_score();
    let apex_req = entry_min + params.apex_score_boost();

    if score >= apex_req
        && snapshot.buyers >= params.min_obs_buyers() + 1
        && snapshot.unique >= params.min_obs_unique()
    {
        Some(Entry::Apex)
    } else if score >= entry_min {
        Some(Entry::Small)
    } else {
        None
    }
}
