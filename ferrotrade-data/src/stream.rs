use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use smol_str::SmolStr;
use tokio_stream::StreamExt;

use crate::adapter::MarketDataAdapter;
use crate::bar::Bar;
use crate::cache::BarCache;
use crate::error::DataError;

/// One streaming connection shared by every [`BarCache`] subscribed through
/// it, routing each incoming bar to the cache for its symbol.
///
/// Grounded on the teacher's book-stream manager: a lock-guarded routing
/// table plus a loop that logs and keeps going across reconnects rather than
/// tearing the whole manager down.
pub struct StreamRouter<A: MarketDataAdapter> {
    adapter: Arc<A>,
    routes: RwLock<HashMap<SmolStr, Arc<BarCache<A>>>>,
}

impl<A: MarketDataAdapter + 'static> StreamRouter<A> {
    pub fn new(adapter: Arc<A>) -> Arc<Self> {
        Arc::new(Self {
            adapter,
            routes: RwLock::new(HashMap::new()),
        })
    }

    /// Register `cache` to receive bars for its symbol and spawn the
    /// background task draining its live feed. Calling this twice for the
    /// same symbol is a no-op (idempotent subscribe), matching the
    /// catch-up-then-subscribe-once behaviour a live strategy driver needs.
    pub async fn subscribe(self: &Arc<Self>, cache: Arc<BarCache<A>>) -> Result<(), DataError> {
        let symbol: SmolStr = cache.symbol().into();
        {
            let mut routes = self.routes.write();
            if routes.contains_key(&symbol) {
                return Ok(());
            }
            routes.insert(symbol.clone(), Arc::clone(&cache));
        }
        // Idempotent on the cache itself too: activates the subscribed flag
        // and runs the catch-up fetch closing any gap since the last fetch.
        cache.subscribe().await?;

        let router = Arc::clone(self);
        let stream_symbol = symbol.clone();
        let mut stream = self.adapter.subscribe(&symbol).await?;
        tokio::spawn(async move {
            while let Some(bar) = stream.next().await {
                router.dispatch(&stream_symbol, bar);
            }
            tracing::warn!(symbol = %stream_symbol, "live feed ended, no longer receiving bars");
        });
        Ok(())
    }

    fn dispatch(&self, symbol: &str, bar: Bar) {
        let routes = self.routes.read();
        let Some(cache) = routes.get(symbol) else {
            tracing::warn!(symbol, "received bar for a symbol with no registered cache");
            return;
        };
        let range = (bar.start, bar.start + cache.native().duration());
        if let Err(err) = cache.add(vec![bar], range) {
            tracing::warn!(symbol, error = %err, "dropping invalid streamed bar");
        }
    }
}
