#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_debug_implementations
)]

//! Per-asset strategy driver, the registry/config/lifecycle scaffolding
//! around it, and the dual-Supertrend reference policy.

pub mod config;
pub mod driver;
pub mod id;
pub mod on_trading_disabled;
pub mod policy;
pub mod registry;

pub use config::{ConfigError, StrategyConfig};
pub use driver::{BarPolicy, StrategyDriver};
pub use id::StrategyId;
pub use on_trading_disabled::OnTradingDisabled;
pub use policy::{DualSupertrendParams, DualSupertrendPolicy, PolicyError};
pub use registry::StrategyRegistry;
