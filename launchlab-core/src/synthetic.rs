//! Deterministic synthetic snapshot/quote streams.
//!
//! Seeded generation for benches and integration tests — never wired into
//! production paths. The shapes are loosely modeled on recorded pumpfun
//! launches: bursty buyer counts, a price random-walk per size tier, and the
//! occasional dead quote.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use crate::domain::{Quote, Snapshot};

/// Knobs for synthetic market generation.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub mints: usize,
    pub snapshots_per_mint: usize,
    pub quotes_per_tier: usize,
    /// Size tiers to quote (SOL notional).
    pub sizes: Vec<f64>,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            mints: 20,
            snapshots_per_mint: 40,
            quotes_per_tier: 80,
            sizes: vec![0.1, 0.4],
            seed: 7,
        }
    }
}

/// Generate per-mint snapshot and quote streams, both time-ordered.
pub fn synthetic_market(
    config: &SyntheticConfig,
) -> (BTreeMap<String, Vec<Snapshot>>, BTreeMap<String, Vec<Quote>>) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let base_ts: i64 = 1_700_000_000;

    let mut events = BTreeMap::new();
    let mut quotes = BTreeMap::new();

    for m in 0..config.mints {
        let mint = format!("MINT{m:04}");

        let snapshots: Vec<Snapshot> = (0..config.snapshots_per_mint)
            .map(|i| {
                let buyers = rng.gen_range(0..13u32);
                let unique = rng.gen_range(0..=buyers.max(1));
                let same = rng.gen_range(0..=buyers);
                Snapshot {
                    mint: mint.clone(),
                    ts: base_ts + (i as i64) * 30,
                    buyers,
                    unique,
                    same,
                    price_jumps: rng.gen_range(0..5),
                    depth: rng.gen_range(0.0..5.0),
                    origin: "pumpfun".into(),
                }
            })
            .collect();

        let mut tier_quotes = Vec::new();
        for &size in &config.sizes {
            let mut price = rng.gen_range(0.5..2.0);
            for i in 0..config.quotes_per_tier {
                price *= 1.0 + rng.gen_range(-0.08..0.09);
                // Roughly 3% dead quotes.
                let quoted = if rng.gen_ratio(3, 100) { 0.0 } else { price };
                tier_quotes.push(Quote {
                    mint: mint.clone(),
                    ts: base_ts + (i as i64) * 15,
                    size,
                    price: quoted,
                });
            }
        }
        tier_quotes.sort_by_key(|q| q.ts);

        events.insert(mint.clone(), snapshots);
        quotes.insert(mint, tier_quotes);
    }

    (events, quotes)
}
