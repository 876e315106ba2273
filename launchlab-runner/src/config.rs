//! Sweep configuration — TOML file or CLI flags, validated at the boundary.
//!
//! Every hard failure in the system happens here or in the loader, before a
//! single snapshot is replayed. The simulation core itself is total.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use launchlab_core::domain::{Params, SizeKey};
use launchlab_core::engine::TradeSettings;

use crate::sweep::SweepConstraints;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// One grid axis value: a scalar pins the parameter, a list sweeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridValue {
    Scalar(f64),
    List(Vec<f64>),
}

/// Full sweep configuration, deserializable from a TOML file.
///
/// ```toml
/// [data]
/// db = "data/bot.sqlite"
/// start = "2025-06-01"
///
/// [trade]
/// take_profit = 0.35
/// stop_loss = 0.25
///
/// [grid]
/// ENTRY_MIN_SCORE = [55, 60, 65]
/// COOLDOWN_SEC = 90
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    pub data: DataSection,
    #[serde(default)]
    pub trade: TradeSettings,
    #[serde(default)]
    pub sweep: SweepConstraints,
    /// Base parameter overrides applied on top of the documented defaults.
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
    #[serde(default)]
    pub grid: BTreeMap<String, GridValue>,
}

/// Where the recorded history lives and the replay window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSection {
    pub db: PathBuf,
    /// Inclusive start date (UTC midnight).
    #[serde(default)]
    pub start: Option<NaiveDate>,
    /// Inclusive end date (UTC midnight).
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl SweepConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Boundary validation: every constraint that would otherwise surface as
    /// a confusing mid-sweep result is rejected here instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| ConfigError::Invalid { field, reason };

        if !self.trade.take_profit.is_finite() || self.trade.take_profit <= 0.0 {
            return Err(invalid(
                "trade.take_profit",
                format!("must be a positive fraction, got {}", self.trade.take_profit),
            ));
        }
        if !self.trade.stop_loss.is_finite() || self.trade.stop_loss <= 0.0 {
            return Err(invalid(
                "trade.stop_loss",
                format!("must be a positive fraction, got {}", self.trade.stop_loss),
            ));
        }
        if self.trade.max_hold_secs <= 0 {
            return Err(invalid(
                "trade.max_hold_secs",
                format!("must be positive, got {}", self.trade.max_hold_secs),
            ));
        }
        if self.trade.size_small <= 0.0 || self.trade.size_large <= 0.0 {
            return Err(invalid(
                "trade.sizes",
                "size_small and size_large must be positive".to_string(),
            ));
        }
        if SizeKey::from_sol(self.trade.size_small) == SizeKey::from_sol(self.trade.size_large) {
            return Err(invalid(
                "trade.sizes",
                "size_small and size_large collapse to the same tier".to_string(),
            ));
        }
        if !self.sweep.max_drawdown_cap.is_finite() || self.sweep.max_drawdown_cap < 0.0 {
            return Err(invalid(
                "sweep.max_drawdown_cap",
                format!("must be non-negative, got {}", self.sweep.max_drawdown_cap),
            ));
        }

        for (name, value) in &self.grid {
            match value {
                GridValue::Scalar(v) if !v.is_finite() => {
                    return Err(invalid("grid", format!("{name}: non-finite value")));
                }
                GridValue::List(vs) if vs.is_empty() => {
                    return Err(invalid("grid", format!("{name}: empty candidate list")));
                }
                GridValue::List(vs) if vs.iter().any(|v| !v.is_finite()) => {
                    return Err(invalid("grid", format!("{name}: non-finite candidate")));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Base parameter set: documented defaults with `[params]` laid on top.
    pub fn base_params(&self) -> Params {
        let mut base = Params::with_defaults();
        for (name, value) in &self.params {
            base.set(name, *value);
        }
        base
    }

    pub fn start_ts(&self) -> Option<i64> {
        self.data.start.map(date_to_epoch)
    }

    pub fn end_ts(&self) -> Option<i64> {
        self.data.end.map(date_to_epoch)
    }
}

/// UTC midnight of a naive date as unix seconds.
pub fn date_to_epoch(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
        .timestamp()
}

/// Content-addressed id for a merged parameter set.
///
/// Two sweep rows with identical params share an id, which makes summary
/// rows joinable across runs.
pub fn run_id(params: &Params) -> String {
    let json = serde_json::to_string(params).expect("Params serialization failed");
    blake3::hash(json.as_bytes()).to_hex().to_string()
}
