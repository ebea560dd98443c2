use std::fs::File;
use std::path::Path;

use ferrotrade_instrument::{Frequency, TimeError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::StrategyId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read strategy config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse strategy config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Frequency(#[from] TimeError),
}

/// A policy instance's identity, bar frequency, and free-form parameter bag,
/// loaded from a JSON file the same way the top crate's own `Config` is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub id: StrategyId,
    pub freq: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl StrategyConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn frequency(&self) -> Result<Frequency, ConfigError> {
        Frequency::parse(&self.freq).map_err(ConfigError::from)
    }

    /// Deserialize `parameters` into a policy-specific parameter struct,
    /// e.g. [`crate::policy::DualSupertrendParams`].
    pub fn parameters_as<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_json::from_value(self.parameters.clone()).map_err(ConfigError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_strategy_config_document() {
        let json = r#"{
            "id": "dual-supertrend-aapl",
            "freq": "5min",
            "parameters": {"short_n": 20, "long_n": 40}
        }"#;
        let config: StrategyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.id, StrategyId::new("dual-supertrend-aapl"));
        assert_eq!(config.frequency().unwrap(), Frequency::parse("5min").unwrap());
    }

    #[test]
    fn missing_parameters_defaults_to_null() {
        let json = r#"{"id": "x", "freq": "1min"}"#;
        let config: StrategyConfig = serde_json::from_str(json).unwrap();
        assert!(config.parameters.is_null());
    }
}
