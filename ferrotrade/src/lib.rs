#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_debug_implementations
)]

//! Bar cache & range stitcher, indicator engine, bracket trade execution
//! state machine, and strategy driver, assembled behind one crate.
//!
//! Each concern lives in its own workspace member; this crate re-exports the
//! pieces an application wires together and adds the top-level [`Config`].

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ferrotrade_data::{Bar, BarCache, BarError, DataError, MarketDataAdapter, StreamRouter};
pub use ferrotrade_execution::{
    Account, BracketStyle, BrokerAdapter, BrokerError, Order, OrderPrice, OrderType, Side, Status,
    TimeInForce, TradeConfig, TradeError, TradeOutcome, TradeState, TradeSubject,
};
pub use ferrotrade_instrument::{
    Asset, AssetError, AssetKind, AssetProfile, AssetRegistry, Frequency, TimeError,
    TradingRestriction, Unit,
};
pub use ferrotrade_integration::{RateLimiter, RetryPolicy, Snapshot, TradingError, UpstreamError};
pub use ferrotrade_strategy::{
    BarPolicy, ConfigError as StrategyConfigError, DualSupertrendParams, DualSupertrendPolicy,
    OnTradingDisabled, PolicyError, StrategyConfig, StrategyDriver, StrategyId, StrategyRegistry,
};
pub use ferrotrade_ta::{atr, bollinger_bands, sma, supertrend, SupertrendPoint};

/// Top-level runtime configuration, loaded once at startup.
///
/// Grounded on [`StrategyConfig::load`](ferrotrade_strategy::StrategyConfig::load)'s
/// `serde_json::from_reader` shape; `extra` absorbs deployment-specific knobs
/// this crate doesn't need to know the shape of.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub default_timeframe: String,
    #[serde(with = "humantime_millis")]
    pub default_poll_interval: Duration,
    pub max_retries: u32,
    pub global_max_risk_perc: Decimal,
    pub global_max_portfolio_perc: Decimal,
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    pub fn default_timeframe(&self) -> Result<Frequency, TimeError> {
        Frequency::parse(&self.default_timeframe)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            ..RetryPolicy::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

mod humantime_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn loads_a_config_document_from_disk() {
        let path = std::env::temp_dir().join(format!("ferrotrade-config-test-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(
            br#"{
                "default_timeframe": "5min",
                "default_poll_interval": 250,
                "max_retries": 4,
                "global_max_risk_perc": "0.01",
                "global_max_portfolio_perc": "0.25"
            }"#,
        )
        .unwrap();
        drop(file);

        let config = Config::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.default_timeframe().unwrap(), Frequency::parse("5min").unwrap());
        assert_eq!(config.default_poll_interval, Duration::from_millis(250));
        assert_eq!(config.global_max_risk_perc, dec!(0.01));
        assert_eq!(config.retry_policy().max_retries, 4);
        assert!(config.extra.is_empty());
    }
}
