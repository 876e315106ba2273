//! LaunchLab Runner — data loading, sweep orchestration, artifacts.
//!
//! Builds on `launchlab-core`:
//! - Sqlite event/quote loader with fuzzy schema discovery
//! - TOML/flag configuration validated before any data is read
//! - Lazy grid expansion and (optionally parallel) sweep execution
//! - Summary CSV + best-row JSON artifacts

pub mod config;
pub mod data_loader;
pub mod reporting;
pub mod sweep;

pub use config::{run_id, ConfigError, GridValue, SweepConfig};
pub use data_loader::{load_events, load_quotes, LoadError};
pub use reporting::{save_artifacts, ArtifactPaths};
pub use sweep::{run_sweep, ParamGrid, SweepConstraints, SweepOutcome, SweepRow};
