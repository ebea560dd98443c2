#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms,
    rust_2024_compatibility
)]

//! Technical analysis utilities: a pure, `Bar`-slice indicator engine used
//! by strategy lookback windows.

pub mod bars;

pub use bars::{atr, bollinger_bands, sma, supertrend, SupertrendPoint};
