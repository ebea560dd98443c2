use ferrotrade_integration::UpstreamError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum BrokerError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("unknown order {0}")]
    UnknownOrder(String),

    #[error("failed to cancel order {0}: {1}")]
    Cancel(String, String),
}

#[derive(Debug, Error, Clone)]
pub enum TradeError {
    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("not enough buying power for {symbol}: sized order was non-positive")]
    InsufficientBuyingPower { symbol: String },

    #[error("entry order {0} was not executed")]
    EntryNotExecuted(String),

    #[error("position leaked on {symbol}: entry {entry_id} filled {entry_filled} but exit order {exit_id:?} only closed {exit_filled}")]
    LeakedPosition {
        symbol: String,
        entry_id: String,
        entry_filled: String,
        exit_id: Option<String>,
        exit_filled: String,
    },
}
