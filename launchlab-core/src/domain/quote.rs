//! Quote — estimated fill price for a discrete trade size.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Estimated fill price for one mint at one size tier.
///
/// Quotes arrive ordered by timestamp within each (mint, size tier) stream.
/// A non-positive price means the quoter found no fill path at that moment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub mint: String,
    /// Unix seconds.
    pub ts: i64,
    /// Trade notional in SOL.
    pub size: f64,
    /// Estimated fill price in SOL.
    pub price: f64,
}

/// Size tier key: SOL notional quantized to micro-SOL.
///
/// Sizes are float-denominated upstream; quantizing to 1e-6 makes tier
/// lookups exact instead of bit-for-bit float comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SizeKey(i64);

impl SizeKey {
    pub fn from_sol(size: f64) -> Self {
        Self((size * 1e6).round() as i64)
    }

    /// The tier notional back in SOL.
    pub fn as_sol(&self) -> f64 {
        self.0 as f64 / 1e6
    }
}

/// Per-mint quote streams indexed by size tier, each sorted by timestamp.
///
/// Built once per dataset and shared read-only across every sweep
/// combination.
#[derive(Debug, Clone, Default)]
pub struct QuoteBook {
    streams: BTreeMap<String, BTreeMap<SizeKey, Vec<Quote>>>,
}

impl QuoteBook {
    pub fn from_quotes(quotes_by_mint: BTreeMap<super::Mint, Vec<Quote>>) -> Self {
        let mut streams: BTreeMap<String, BTreeMap<SizeKey, Vec<Quote>>> = BTreeMap::new();
        for (mint, quotes) in quotes_by_mint {
            let tiers = streams.entry(mint).or_default();
            for quote in quotes {
                tiers
                    .entry(SizeKey::from_sol(quote.size))
                    .or_default()
                    .push(quote);
            }
        }
        for tiers in streams.values_mut() {
            for stream in tiers.values_mut() {
                stream.sort_by_key(|q| q.ts);
            }
        }
        Self { streams }
    }

    pub fn has_mint(&self, mint: &str) -> bool {
        self.streams.contains_key(mint)
    }

    /// The sorted quote stream for one (mint, tier), if any quotes exist.
    pub fn stream(&self, mint: &str, tier: SizeKey) -> Option<&[Quote]> {
        self.streams
            .get(mint)
            .and_then(|tiers| tiers.get(&tier))
            .map(Vec::as_slice)
    }

    pub fn mint_count(&self) -> usize {
        self.streams.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(ts: i64, size: f64, price: f64) -> Quote {
        Quote {
            mint: "M1".into(),
            ts,
            size,
            price,
        }
    }

    #[test]
    fn size_key_quantizes_float_noise() {
        assert_eq!(SizeKey::from_sol(0.1), SizeKey::from_sol(0.10000000000000002));
        assert_eq!(SizeKey::from_sol(0.30000000000000004), SizeKey::from_sol(0.3));
        assert_ne!(SizeKey::from_sol(0.1), SizeKey::from_sol(0.4));
    }

    #[test]
    fn streams_are_split_by_tier_and_sorted() {
        let mut by_mint = BTreeMap::new();
        by_mint.insert(
            "M1".to_string(),
            vec![quote(30, 0.1, 1.2), quote(10, 0.4, 1.0), quote(20, 0.1, 1.1)],
        );
        let book = QuoteBook::from_quotes(by_mint);

        let small = book.stream("M1", SizeKey::from_sol(0.1)).unwrap();
        assert_eq!(small.len(), 2);
        assert_eq!(small[0].ts, 20);
        assert_eq!(small[1].ts, 30);

        let large = book.stream("M1", SizeKey::from_sol(0.4)).unwrap();
        assert_eq!(large.len(), 1);

        assert!(book.stream("M1", SizeKey::from_sol(0.2)).is_none());
        assert!(book.stream("M2", SizeKey::from_sol(0.1)).is_none());
    }
}
