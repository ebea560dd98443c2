use std::sync::Arc;

use async_trait::async_trait;
use ferrotrade_data::{Bar, BarCache, MarketDataAdapter};
use ferrotrade_instrument::{Asset, AssetKind, Frequency};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// A trading decision made on each new bar for one asset.
///
/// `cache` is handed alongside `asset` so a policy can pull whatever lookback
/// window it needs (`cache.get(.., lag)`) rather than the driver guessing a
/// lookback depth on its behalf.
#[async_trait]
pub trait BarPolicy<A: MarketDataAdapter, K: AssetKind>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn on_bar(
        &self,
        asset: &Arc<Asset<K>>,
        cache: &Arc<BarCache<A>>,
        freq: Frequency,
        last_bar: Bar,
    ) -> Result<(), Self::Error>;
}

/// Runs one background task per asset, each looping on
/// [`BarCache::wait_for_next`] and invoking a shared policy's `on_bar`.
/// Errors from the policy are logged and the loop continues; errors waiting
/// for the next bar are logged and retried on the following iteration.
#[derive(Debug, Default)]
pub struct StrategyDriver {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl StrategyDriver {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawn one task per `(asset, cache, freq)` triple, all sharing `policy`.
    pub fn run<A, K, P>(&self, assets: Vec<(Arc<Asset<K>>, Arc<BarCache<A>>, Frequency)>, policy: Arc<P>)
    where
        A: MarketDataAdapter + 'static,
        K: AssetKind,
        P: BarPolicy<A, K> + 'static,
    {
        let mut tasks = self.tasks.lock();
        for (asset, cache, freq) in assets {
            let policy = Arc::clone(&policy);
            let handle = tokio::spawn(async move {
                loop {
                    match cache.wait_for_next(freq).await {
                        Ok(last_bar) => {
                            if let Err(err) = policy.on_bar(&asset, &cache, freq, last_bar).await {
                                tracing::error!(
                                    symbol = %asset.symbol(),
                                    error = %err,
                                    "strategy policy failed on bar"
                                );
                            }
                        }
                        Err(err) => {
                            tracing::warn!(
                                symbol = %asset.symbol(),
                                error = %err,
                                "failed to await next bar, retrying"
                            );
                        }
                    }
                }
            });
            tasks.push(handle);
        }
    }

    /// How many asset-tasks are currently running.
    pub fn task_count(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Cancel every running asset-task and await their cancellation
    /// acknowledgement before returning.
    pub async fn stop(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            task.abort();
            let _ = task.await;
        }
    }

    /// Run `hook` (e.g. cancel every open order) before cancelling the
    /// asset-tasks, so it still observes them as live while it acts.
    pub async fn stop_and_disable<H: crate::on_trading_disabled::OnTradingDisabled>(&self, hook: &H) {
        hook.on_trading_disabled().await;
        self.stop().await;
    }
}
