use std::time::Duration;

use thiserror::Error;

/// Shared error taxonomy surfaced by the data and execution adapters.
///
/// Variants are split along the line that matters to a caller: is this worth
/// retrying, or is it a final answer from the upstream system.
#[derive(Debug, Error, Clone)]
pub enum UpstreamError {
    /// The request itself failed to complete (connection reset, timeout,
    /// 5xx/429 status). Callers should retry through [`retry`].
    #[error("transient network error: {0}")]
    TransientNetwork(String),

    /// The upstream system answered and rejected the request outright
    /// (4xx other than 429, a venue-level rejection). Not retryable.
    #[error("upstream rejected request: {0}")]
    UpstreamReject(String),

    /// Retries were exhausted without a non-retryable response.
    #[error("max retries ({retries}) exhausted: {last}")]
    MaxRetries { retries: u32, last: String },
}

impl UpstreamError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, UpstreamError::TransientNetwork(_))
    }
}

/// Errors raised while executing a bracket trade.
#[derive(Debug, Error, Clone)]
pub enum TradingError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("order {0} was not executed")]
    OrderNotExecuted(String),

    #[error("failed to cancel order {0}: {1}")]
    CancelOrder(String, String),

    #[error("position leaked: entry order {entry_id} filled but exit order {exit_id:?} did not fully close it")]
    LeakedPosition {
        entry_id: String,
        exit_id: Option<String>,
    },
}

/// Configuration for [`crate::retry::retry`].
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}
