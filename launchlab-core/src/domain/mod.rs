//! Domain types for LaunchLab.

pub mod params;
pub mod quote;
pub mod snapshot;
pub mod trade;

pub use params::Params;
pub use quote::{Quote, QuoteBook, SizeKey};
pub use snapshot::Snapshot;
pub use trade::{ExitReason, TradeRecord};

/// Mint address type alias.
pub type Mint = String;
