#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_debug_implementations
)]

pub mod error;
pub mod rate_limit;
pub mod retry;
pub mod snapshot;

pub use error::{RetryPolicy, TradingError, UpstreamError};
pub use rate_limit::{Priority, RateLimiter};
pub use snapshot::{SnapUpdates, Snapshot};
