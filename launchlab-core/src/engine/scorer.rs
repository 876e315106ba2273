//! Signal scorer — hard safety veto plus a bucketed 0–100 conviction score.

use crate::domain::{Params, Snapshot};

/// Hard filter. False iff the same-funder ratio exceeds `SAME_FUNDER_FATAL`.
///
/// Boundary equality passes. The veto is independent of the conviction
/// score: a vetoed snapshot never trades, whatever it would have scored.
pub fn safety_gate(snapshot: &Snapshot, params: &Params) -> bool {
    snapshot.same_funder_ratio() <= params.same_funder_fatal()
}

/// Additive bucketed conviction score, clamped to [0, 100].
///
/// Bucket boundaries are exact: the sub-threshold buyer and unique-funder
/// tiers match on equality, not ≥.
pub fn conviction(snapshot: &Snapshot, params: &Params) -> i32 {
    let min_buyers = params.min_obs_buyers();
    let min_unique = params.min_obs_unique();
    let soft_limit = params.same_funder_limit();
    let fatal = params.same_funder_fatal();

    let mut score: i32 = 0;

    // Buyer buckets: +30 / +20 / +10, lower tiers floored at zero.
    if snapshot.buyers >= min_buyers {
        score += 30;
    } else if snapshot.buyers == min_buyers.saturating_sub(1) {
        score += 20;
    } else if snapshot.buyers == min_buyers.saturating_sub(2) {
        score += 10;
    }

    // Unique-funder buckets: +20 / +10.
    if snapshot.unique >= min_unique {
        score += 20;
    } else if snapshot.unique == min_unique.saturating_sub(1) {
        score += 10;
    }

    // Price jumps: +30 / +20 / +10.
    if snapshot.price_jumps >= 3 {
        score += 30;
    } else if snapshot.price_jumps == 2 {
        score += 20;
    } else if snapshot.price_jumps == 1 {
        score += 10;
    }

    // Depth: +10 / +5 — lightweight liquidity proxy.
    if snapshot.depth >= 3.0 {
        score += 10;
    } else if snapshot.depth >= 2.0 {
        score += 5;
    }

    // Same-funder concentration beyond the soft limit scales a penalty up
    // to 40 as the ratio approaches the fatal threshold.
    let ratio = snapshot.same_funder_ratio();
    if ratio > soft_limit {
        let span = (fatal - soft_limit).max(1e-6);
        let over = (ratio - soft_limit).min(span);
        score -= (40.0 * over / span).round() as i32;
    }

    score.clamp(0, 100)
}
