use derive_more::Display;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Opaque identifier distinguishing concurrently-registered policy instances
/// in a [`crate::registry::StrategyRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub struct StrategyId(SmolStr);

impl StrategyId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StrategyId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
