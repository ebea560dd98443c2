use async_trait::async_trait;

/// Hook a policy can implement to describe what should happen when trading
/// is disabled for it -- cancelling open orders, flattening a position, or
/// simply logging. Invoked by [`crate::driver::StrategyDriver::stop_and_disable`]
/// before its asset-tasks are cancelled, so the hook still has a live broker
/// connection to act with.
#[async_trait]
pub trait OnTradingDisabled: Send + Sync {
    async fn on_trading_disabled(&self);
}
