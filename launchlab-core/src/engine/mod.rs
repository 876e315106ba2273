//! Engine: scorer, decision state machine, simulator, run accounting.

pub mod accounting;
pub mod decision;
pub mod scorer;
pub mod simulator;

pub use accounting::{EquityTracker, RunMetrics};
pub use decision::{decide, Entry, TradeState};
pub use scorer::{conviction, safety_gate};
pub use simulator::{run_simulation, TradeSettings};
