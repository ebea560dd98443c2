#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_debug_implementations
)]

pub mod adapter;
pub mod bar;
pub mod cache;
pub mod error;
pub mod resample;
pub mod stream;

pub use adapter::MarketDataAdapter;
pub use bar::{Bar, BarError};
pub use cache::BarCache;
pub use error::DataError;
pub use stream::StreamRouter;
