use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::bar::Bar;
use crate::error::DataError;

/// Abstraction over a concrete market-data venue.
///
/// `fetch` serves historical bars for `[start, end)` at the adapter's native
/// frequency; pagination against the upstream API, if any, is entirely the
/// adapter's concern -- the cache only ever sees one assembled `Vec<Bar>` per
/// call. `subscribe` opens (or reuses) the venue's live feed for `symbol` and
/// returns a stream of newly closed native-frequency bars.
#[async_trait]
pub trait MarketDataAdapter: Send + Sync {
    async fn fetch(&self, symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Bar>, DataError>;

    async fn subscribe(&self, symbol: &str) -> Result<tokio_stream::wrappers::ReceiverStream<Bar>, DataError>;
}

/// In-memory adapter for tests: `fetch` slices a fixed bar table, `subscribe`
/// hands back a channel the test pushes bars into directly.
///
/// Grounded on the backtest-provider pattern of an in-memory fill table
/// standing in for a real venue client.
pub mod mock {
    use std::collections::HashMap;

    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    use super::*;

    #[derive(Default)]
    pub struct MockMarketDataAdapter {
        bars: Mutex<HashMap<String, Vec<Bar>>>,
    }

    impl MockMarketDataAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, symbol: &str, bars: Vec<Bar>) {
            self.bars.lock().insert(symbol.to_string(), bars);
        }
    }

    #[async_trait]
    impl MarketDataAdapter for MockMarketDataAdapter {
        async fn fetch(&self, symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Bar>, DataError> {
            let guard = self.bars.lock();
            let bars = guard.get(symbol).cloned().unwrap_or_default();
            Ok(bars
                .into_iter()
                .filter(|b| b.start >= start && b.start < end)
                .collect())
        }

        async fn subscribe(&self, _symbol: &str) -> Result<tokio_stream::wrappers::ReceiverStream<Bar>, DataError> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(tokio_stream::wrappers::ReceiverStream::new(rx))
        }
    }
}
