//! LaunchLab Core — scoring, decision state machine, and trade simulation.
//!
//! The deterministic heart of the backtester:
//! - Domain types (snapshots, quotes, params, trades)
//! - Signal scorer (hard safety veto + bucketed conviction score)
//! - Per-mint decision state machine with cooldown semantics
//! - Trade simulator with temporal quote matching and equity/drawdown tracking
//! - Synthetic stream generator for benches and tests
//!
//! No I/O lives here: loading, sweeping, and reporting belong to
//! `launchlab-runner`.

pub mod domain;
pub mod engine;
pub mod synthetic;
