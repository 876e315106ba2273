//! Strategy tunables with documented defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default value for every known tunable.
pub const DEFAULTS: &[(&str, f64)] = &[
    ("APEX_SCORE_BOOST", 20.0),
    ("COOLDOWN_SEC", 60.0),
    ("ENTRY_MIN_SCORE", 60.0),
    ("MIN_OBS_BUYERS", 7.0),
    ("MIN_OBS_UNIQUE", 6.0),
    ("SAME_FUNDER_FATAL", 0.75),
    ("SAME_FUNDER_LIMIT", 0.7),
];

/// Named numeric tunables controlling scoring thresholds and cooldown.
///
/// Stored as a plain name → value map so sweep overrides merge without the
/// engine knowing which keys a grid touches. The typed accessors fall back
/// to the documented defaults for absent keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, f64>);

fn default_for(name: &str) -> f64 {
    DEFAULTS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
        .unwrap_or(0.0)
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// A parameter set with every documented default materialized.
    ///
    /// Sweep rows are built on this so report columns carry the full set,
    /// not only the swept keys.
    pub fn with_defaults() -> Self {
        Self(
            DEFAULTS
                .iter()
                .map(|(key, value)| (key.to_string(), *value))
                .collect(),
        )
    }

    /// Value for `name`, falling back to the documented default
    /// (0.0 for unknown names).
    pub fn get(&self, name: &str) -> f64 {
        self.0
            .get(name)
            .copied()
            .unwrap_or_else(|| default_for(name))
    }

    /// Raw stored value, no default fallback.
    pub fn lookup(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.0.insert(name.to_string(), value);
    }

    /// A copy with `overrides` applied on top (override wins).
    pub fn merged(&self, overrides: &Params) -> Params {
        let mut merged = self.clone();
        for (name, value) in overrides.iter() {
            merged.0.insert(name.clone(), *value);
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    // ── Typed accessors ──

    pub fn entry_min_score(&self) -> i32 {
        self.get("ENTRY_MIN_SCORE") as i32
    }

    pub fn apex_score_boost(&self) -> i32 {
        self.get("APEX_SCORE_BOOST") as i32
    }

    pub fn min_obs_buyers(&self) -> u32 {
        self.get("MIN_OBS_BUYERS") as u32
    }

    pub fn min_obs_unique(&self) -> u32 {
        self.get("MIN_OBS_UNIQUE") as u32
    }

    pub fn same_funder_limit(&self) -> f64 {
        self.get("SAME_FUNDER_LIMIT")
    }

    pub fn same_funder_fatal(&self) -> f64 {
        self.get("SAME_FUNDER_FATAL")
    }

    pub fn cooldown_secs(&self) -> i64 {
        self.get("COOLDOWN_SEC") as i64
    }
}
