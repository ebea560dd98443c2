use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use ferrotrade_instrument::Frequency;
use ferrotrade_integration::retry::retry;
use ferrotrade_integration::{RetryPolicy, UpstreamError};
use parking_lot::Mutex;
use smol_str::SmolStr;
use tokio::sync::Notify;

use crate::adapter::MarketDataAdapter;
use crate::bar::Bar;
use crate::error::DataError;
use crate::resample::resample;

type CoveredRange = (DateTime<Utc>, DateTime<Utc>);

struct CacheState {
    /// Native-frequency bars, ascending by `start`, unique `start`s.
    series: Vec<Bar>,
    /// The single contiguous `[start, end)` the cache has authoritatively
    /// fetched from upstream. `None` until the first fetch.
    covered: Option<CoveredRange>,
    /// Set once `subscribe` has activated streaming for this cache; further
    /// calls are a no-op so a strategy loop can call it unconditionally.
    subscribed: bool,
}

/// Per-asset OHLCV cache merging historical REST fetches with live streaming
/// updates, with gapless covered-interval bookkeeping: the cache only ever
/// tracks one contiguous fetched range, growing it by prepending or
/// appending whatever upstream window a request needs.
pub struct BarCache<A: MarketDataAdapter> {
    symbol: SmolStr,
    native: Frequency,
    adapter: Arc<A>,
    retry_policy: RetryPolicy,
    state: Mutex<CacheState>,
    /// Signalled every time a native bar is appended, so `wait_for_next` can
    /// wake without polling.
    new_bar: Notify,
}

impl<A: MarketDataAdapter> BarCache<A> {
    pub fn new(symbol: impl Into<SmolStr>, native: Frequency, adapter: Arc<A>) -> Self {
        Self {
            symbol: symbol.into(),
            native,
            adapter,
            retry_policy: RetryPolicy::default(),
            state: Mutex::new(CacheState {
                series: Vec::new(),
                covered: None,
                subscribed: false,
            }),
            new_bar: Notify::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn native(&self) -> Frequency {
        self.native
    }

    pub fn covered_range(&self) -> Option<CoveredRange> {
        self.state.lock().covered
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.lock().subscribed
    }

    /// Merge externally-sourced bars (e.g. a live stream tick) into the
    /// cache, extending the covered range to include `[start, end)` even
    /// when `bars` is empty (a quiet upstream period is still authoritative
    /// coverage, per the range-stitcher contract).
    pub fn add(&self, bars: Vec<Bar>, fetched: CoveredRange) -> Result<(), DataError> {
        for bar in &bars {
            bar.validate()?;
        }
        let has_new_bars = !bars.is_empty();
        let mut state = self.state.lock();
        merge_series(&mut state.series, bars);
        state.covered = Some(match state.covered {
            None => fetched,
            Some((cs, ce)) => (cs.min(fetched.0), ce.max(fetched.1)),
        });
        drop(state);
        if has_new_bars {
            self.new_bar.notify_waiters();
        }
        Ok(())
    }

    /// Activate streaming for this cache. Idempotent: the second and later
    /// calls are a no-op. The first call performs a catch-up fetch closing
    /// any gap between the covered range and `now`, so bars that arrived
    /// while nobody was subscribed aren't silently skipped.
    pub async fn subscribe(&self) -> Result<(), DataError> {
        let already_subscribed = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.subscribed, true)
        };
        if already_subscribed {
            return Ok(());
        }

        let gap_end = self.native.floor(Utc::now()) - self.native.duration();
        let needs_catchup = matches!(self.covered_range(), Some((_, ce)) if ce < gap_end);
        if needs_catchup {
            if let Some((_, ce)) = self.covered_range() {
                self.ensure_covered((ce, gap_end + self.native.duration())).await?;
            }
        }
        Ok(())
    }

    /// Suspend until the next bar completed at `freq` is available, then
    /// return it. For the native frequency this resolves on the very next
    /// `add`; for a coarser frequency it waits (with a grace period past the
    /// bucket boundary) until enough native bars have accumulated to close
    /// that bucket, then resamples and returns the closed bucket.
    pub async fn wait_for_next(&self, freq: Frequency) -> Result<Bar, DataError> {
        self.new_bar.notified().await;
        let mut last = self.last_native_bar().ok_or_else(|| DataError::NoBarAvailable {
            start: "<none>".to_string(),
            end: "<none>".to_string(),
        })?;

        if freq == self.native {
            return Ok(last);
        }

        let bucket_start = freq.floor(last.start);
        let bucket_end = bucket_start + freq.duration() - self.native.duration();
        while last.start < bucket_end {
            let remaining = (bucket_end - last.start).to_std().unwrap_or(StdDuration::ZERO);
            let wait_budget = remaining + STREAM_GRACE_PERIOD;
            match tokio::time::timeout(wait_budget, self.new_bar.notified()).await {
                Ok(()) => last = self.last_native_bar().unwrap_or(last),
                Err(_elapsed) => break,
            }
        }

        let bars = self.get(bucket_start, bucket_end, freq, 0).await?;
        bars.last().copied().ok_or_else(|| DataError::NoBarAvailable {
            start: bucket_start.to_rfc3339(),
            end: bucket_end.to_rfc3339(),
        })
    }

    fn last_native_bar(&self) -> Option<Bar> {
        self.state.lock().series.last().copied()
    }

    /// Fetch (if necessary) and return `lag` native-period bars of lookback
    /// before `start`, resampled to `freq`, through `end` (clamped so the
    /// still-forming current bar is never returned).
    pub async fn get(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        freq: Frequency,
        lag: u32,
    ) -> Result<Vec<Bar>, DataError> {
        freq.require_multiple_of(&self.native)
            .map_err(|_| DataError::FrequencyMismatch {
                requested: freq.to_string(),
                native: self.native.to_string(),
            })?;
        if start > end {
            return Err(DataError::EmptyRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        let required_start = self.native.floor(start - freq.duration() * lag as i32);
        let clamped_end = end.min(freq.max_end(Utc::now()));
        if required_start > clamped_end {
            return Ok(Vec::new());
        }
        let required = (required_start, clamped_end + self.native.duration());

        self.ensure_covered(required).await?;

        let native_slice: Vec<Bar> = {
            let state = self.state.lock();
            state
                .series
                .iter()
                .filter(|b| b.start >= required.0 && b.start < required.1)
                .copied()
                .collect()
        };

        Ok(resample(&native_slice, freq))
    }

    async fn ensure_covered(&self, required: CoveredRange) -> Result<(), DataError> {
        let missing = {
            let state = self.state.lock();
            missing_subranges(state.covered, required)
        };
        for range in missing {
            let policy = self.retry_policy;
            let adapter = Arc::clone(&self.adapter);
            let symbol = self.symbol.clone();
            let bars = retry(policy, || {
                let adapter = Arc::clone(&adapter);
                let symbol = symbol.clone();
                async move {
                    adapter
                        .fetch(&symbol, range.0, range.1)
                        .await
                        .map_err(to_upstream_error)
                }
            })
            .await
            .map_err(DataError::Upstream)?;
            self.add(bars, range)?;
        }
        Ok(())
    }
}

fn to_upstream_error(err: DataError) -> UpstreamError {
    match err {
        DataError::Upstream(e) => e,
        other => UpstreamError::UpstreamReject(other.to_string()),
    }
}

/// The at-most-two gaps between `required` and the single `covered` range,
/// in fetch order (prepend gap first, append gap second). A disjoint
/// request still yields a single bridging fetch so `covered` never splits
/// into two islands.
fn missing_subranges(covered: Option<CoveredRange>, required: CoveredRange) -> Vec<CoveredRange> {
    match covered {
        None => vec![required],
        Some((cs, ce)) => {
            let mut out = Vec::new();
            if required.0 < cs {
                out.push((required.0, cs));
            }
            if required.1 > ce {
                out.push((ce, required.1));
            }
            out
        }
    }
}

fn merge_series(series: &mut Vec<Bar>, new_bars: Vec<Bar>) {
    for bar in new_bars {
        match series.binary_search_by_key(&bar.start, |b| b.start) {
            Ok(idx) => series[idx] = bar,
            Err(idx) => series.insert(idx, bar),
        }
    }
}

/// Elapsed-time helper used by a streaming driver's grace-period poll, kept
/// here so callers don't depend on `std::time` directly: two seconds past a
/// bar's close boundary before giving up and polling anyway.
pub const STREAM_GRACE_PERIOD: StdDuration = StdDuration::from_secs(2);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;

    use super::*;
    use crate::adapter::mock::MockMarketDataAdapter;

    fn bar(start: DateTime<Utc>, close: Decimal) -> Bar {
        Bar {
            start,
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(10),
            price: close,
            trade_count: None,
        }
    }

    use rust_decimal::Decimal;

    fn minute(n: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(n * 60, 0).unwrap()
    }

    #[tokio::test]
    async fn fetches_once_then_serves_from_cache() {
        let adapter = Arc::new(MockMarketDataAdapter::new());
        let bars: Vec<Bar> = (0..10).map(|i| bar(minute(i), Decimal::from(i))).collect();
        adapter.seed("TEST", bars);
        let native = Frequency::parse("1min").unwrap();
        let cache = BarCache::new("TEST", native, adapter);

        let first = cache
            .get(minute(0), minute(4), native, 0)
            .await
            .expect("first fetch succeeds");
        assert_eq!(first.len(), 5);

        // second call for a subrange already covered must not need any more
        // upstream data: the covered range already contains it.
        let covered_before = cache.covered_range();
        let second = cache
            .get(minute(1), minute(2), native, 0)
            .await
            .expect("served from cache");
        assert_eq!(second.len(), 2);
        assert_eq!(cache.covered_range(), covered_before);
    }

    #[tokio::test]
    async fn extends_covered_range_on_append_and_prepend() {
        let adapter = Arc::new(MockMarketDataAdapter::new());
        let bars: Vec<Bar> = (0..20).map(|i| bar(minute(i), Decimal::from(i))).collect();
        adapter.seed("TEST", bars);
        let native = Frequency::parse("1min").unwrap();
        let cache = BarCache::new("TEST", native, adapter);

        cache.get(minute(5), minute(9), native, 0).await.unwrap();
        let (cs, ce) = cache.covered_range().unwrap();
        assert_eq!(cs, minute(5));
        assert_eq!(ce, minute(10));

        // append forward
        cache.get(minute(5), minute(14), native, 0).await.unwrap();
        let (_, ce2) = cache.covered_range().unwrap();
        assert_eq!(ce2, minute(15));

        // prepend backward
        cache.get(minute(0), minute(14), native, 0).await.unwrap();
        let (cs3, _) = cache.covered_range().unwrap();
        assert_eq!(cs3, minute(0));
    }

    #[tokio::test]
    async fn resamples_to_the_requested_frequency() {
        let adapter = Arc::new(MockMarketDataAdapter::new());
        let bars: Vec<Bar> = (0..10).map(|i| bar(minute(i), Decimal::from(i))).collect();
        adapter.seed("TEST", bars);
        let native = Frequency::parse("1min").unwrap();
        let five_min = Frequency::parse("5min").unwrap();
        let cache = BarCache::new("TEST", native, adapter);

        let out = cache.get(minute(0), minute(9), five_min, 0).await.unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn missing_subranges_bridges_disjoint_requests() {
        let covered = Some((minute(0), minute(5)));
        let required = (minute(10), minute(15));
        let missing = missing_subranges(covered, required);
        // bridging fetch covers the gap too, keeping `covered` contiguous.
        assert_eq!(missing, vec![(minute(5), minute(15))]);
    }

    #[tokio::test]
    async fn wait_for_next_resolves_once_per_native_bar() {
        let adapter = Arc::new(MockMarketDataAdapter::new());
        let native = Frequency::parse("1min").unwrap();
        let cache = Arc::new(BarCache::new("TEST", native, adapter));

        let waiter = Arc::clone(&cache);
        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..3 {
                let bar = waiter.wait_for_next(native).await.unwrap();
                seen.push(bar.close);
            }
            seen
        });

        for i in 0..3 {
            tokio::task::yield_now().await;
            cache
                .add(vec![bar(minute(i), Decimal::from(i))], (minute(i), minute(i + 1)))
                .unwrap();
        }

        let seen = handle.await.unwrap();
        assert_eq!(seen, vec![dec!(0), dec!(1), dec!(2)]);
    }

    #[tokio::test]
    async fn subscribe_is_idempotent() {
        let adapter = Arc::new(MockMarketDataAdapter::new());
        let native = Frequency::parse("1min").unwrap();
        let cache = BarCache::new("TEST", native, adapter);

        assert!(!cache.is_subscribed());
        cache.subscribe().await.unwrap();
        assert!(cache.is_subscribed());
        // second call is a no-op, not an error.
        cache.subscribe().await.unwrap();
        assert!(cache.is_subscribed());
    }

    #[tokio::test]
    async fn add_extends_covered_range_even_with_no_bars() {
        let adapter = Arc::new(MockMarketDataAdapter::new());
        let native = Frequency::parse("1min").unwrap();
        let cache = BarCache::new("TEST", native, adapter);

        cache.add(Vec::new(), (minute(0), minute(5))).unwrap();
        assert_eq!(cache.covered_range(), Some((minute(0), minute(5))));
    }
}
