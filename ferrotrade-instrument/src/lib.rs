#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_debug_implementations
)]

pub mod asset;
pub mod error;
pub mod restriction;
pub mod time;

pub use asset::{Asset, AssetKind, AssetProfile, AssetRegistry};
pub use error::{AssetError, TimeError};
pub use restriction::TradingRestriction;
pub use time::{Frequency, Unit};
