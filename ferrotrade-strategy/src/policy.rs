use std::sync::Arc;

use async_trait::async_trait;
use ferrotrade_data::{Bar, BarCache, DataError, MarketDataAdapter};
use ferrotrade_execution::{BracketStyle, BrokerAdapter, Side, TradeConfig, TradeError, TradeOutcome, TradeSubject};
use ferrotrade_instrument::{Asset, AssetKind, Frequency};
use ferrotrade_ta::{atr, supertrend};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use crate::driver::BarPolicy;

/// The dual-Supertrend reference policy's tunables, deserialized from
/// [`crate::config::StrategyConfig::parameters`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DualSupertrendParams {
    #[serde(default = "default_short_n")]
    pub short_n: usize,
    #[serde(default = "default_short_k")]
    pub short_k: Decimal,
    #[serde(default = "default_long_n")]
    pub long_n: usize,
    #[serde(default = "default_long_k")]
    pub long_k: Decimal,
    #[serde(default = "default_risk_multiplier")]
    pub risk_multiplier: Decimal,
}

fn default_short_n() -> usize {
    20
}
fn default_short_k() -> Decimal {
    Decimal::from(3)
}
fn default_long_n() -> usize {
    40
}
fn default_long_k() -> Decimal {
    Decimal::from(5)
}
fn default_risk_multiplier() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Trade(#[from] TradeError),
}

/// Checks short-Supertrend/long-Supertrend concurrence on each new bar and,
/// when both agree, opens a risk-sized bracket trade whose risk is
/// `risk_multiplier · ATR`.
///
/// Grounded directly on `SupertrendStrategy.next`: fetch `long_n` bars of
/// lookback, compute both Supertrends, require the two `bullish` flags to
/// agree, size risk off the long-window ATR, and invoke the bracket trade
/// state machine -- any [`TradeError`] is returned to the driver, which logs
/// it and keeps the asset-task running for the next bar.
pub struct DualSupertrendPolicy<B: BrokerAdapter> {
    broker: Arc<B>,
    params: DualSupertrendParams,
    trade_config: TradeConfig,
    bracket_style: BracketStyle,
}

impl<B: BrokerAdapter> DualSupertrendPolicy<B> {
    pub fn new(broker: Arc<B>, params: DualSupertrendParams, trade_config: TradeConfig, bracket_style: BracketStyle) -> Self {
        Self {
            broker,
            params,
            trade_config,
            bracket_style,
        }
    }
}

#[async_trait]
impl<A, K, B> BarPolicy<A, K> for DualSupertrendPolicy<B>
where
    A: MarketDataAdapter,
    K: AssetKind,
    B: BrokerAdapter,
{
    type Error = PolicyError;

    async fn on_bar(&self, asset: &Arc<Asset<K>>, cache: &Arc<BarCache<A>>, freq: Frequency, last_bar: Bar) -> Result<(), PolicyError> {
        if !asset.profile().restriction.is_trading(last_bar.start) {
            return Ok(());
        }

        // Supertrend needs strictly more than one ATR window to produce a
        // point past its seed row, so fetch several multiples of the longer
        // period rather than exactly `long_n` bars of lookback.
        let lookback = (self.params.long_n as u32).saturating_mul(3);
        let bars = cache.get(last_bar.start, last_bar.start, freq, lookback).await?;
        if bars.len() < 2 {
            return Ok(());
        }

        let short_trend = supertrend(&bars, self.params.short_n, self.params.short_k);
        let long_trend = supertrend(&bars, self.params.long_n, self.params.long_k);
        let (Some(short_last), Some(long_last)) = (short_trend.last(), long_trend.last()) else {
            return Ok(());
        };
        if short_last.bullish != long_last.bullish {
            return Ok(());
        }

        let atr_values = atr(&bars, self.params.long_n);
        let Some(&(_, atr_last)) = atr_values.last() else {
            return Ok(());
        };
        let risk = self.params.risk_multiplier * atr_last;
        let side = if long_last.bullish { Side::Buy } else { Side::Sell };

        tracing::info!(
            symbol = %asset.symbol(),
            %risk,
            ?side,
            "dual-supertrend concurrence, opening bracket trade"
        );

        let subject = TradeSubject {
            symbol: SmolStr::new(asset.symbol()),
            min_price_increment: asset.profile().min_price_increment,
            min_size_increment: asset.profile().min_size_increment,
        };
        let outcome: TradeOutcome = ferrotrade_execution::trade::execute_bracket_trade(
            self.broker.as_ref(),
            &subject,
            side,
            last_bar.close,
            risk,
            &self.trade_config,
            self.bracket_style,
        )
        .await?;

        tracing::info!(symbol = %asset.symbol(), state = %outcome.state, "bracket trade finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use ferrotrade_data::adapter::mock::MockMarketDataAdapter;
    use ferrotrade_execution::broker::mock::{FillBehaviour, MockBrokerAdapter};
    use ferrotrade_execution::Account;
    use ferrotrade_instrument::{AssetProfile, AssetRegistry, TradingRestriction};
    use rust_decimal_macros::dec;

    use super::*;

    struct TestKind;
    impl AssetKind for TestKind {
        fn default_profile() -> AssetProfile {
            AssetProfile {
                timezone_name: "UTC",
                restriction: TradingRestriction::always(),
                min_price_increment: dec!(0.01),
                min_size_increment: dec!(1),
            }
        }
    }

    fn minute(n: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(n * 60, 0).unwrap()
    }

    fn trending_bar(i: i64, price: Decimal) -> Bar {
        Bar {
            start: minute(i),
            open: price,
            high: price + dec!(1),
            low: price - dec!(1),
            close: price,
            volume: dec!(10),
            price,
            trade_count: None,
        }
    }

    #[tokio::test]
    async fn concurrence_on_a_steady_uptrend_opens_and_closes_a_trade() {
        AssetRegistry::reset::<TestKind>();
        let asset = AssetRegistry::get::<TestKind>("TEST");

        let data_adapter = Arc::new(MockMarketDataAdapter::new());
        let bars: Vec<Bar> = (0..60).map(|i| trending_bar(i, Decimal::from(100 + i))).collect();
        data_adapter.seed("TEST", bars.clone());
        let native = Frequency::parse("1min").unwrap();
        let cache = Arc::new(BarCache::new("TEST", native, data_adapter));
        cache.get(minute(0), minute(59), native, 0).await.unwrap();

        let broker = Arc::new(MockBrokerAdapter::new(Account::new(dec!(100_000), dec!(100_000))));
        broker.set_fill_behaviour("TEST", FillBehaviour::FullFillAt(dec!(159)));

        let policy = DualSupertrendPolicy::new(
            Arc::clone(&broker),
            DualSupertrendParams {
                short_n: 10,
                short_k: dec!(3),
                long_n: 20,
                long_k: dec!(5),
                risk_multiplier: dec!(1),
            },
            TradeConfig::new(dec!(1), dec!(50), dec!(2)),
            BracketStyle::Oco,
        );

        let last_bar = bars.last().copied().unwrap();
        policy.on_bar(&asset, &cache, native, last_bar).await.unwrap();
    }

    #[tokio::test]
    async fn restricted_asset_is_skipped_without_touching_the_broker() {
        struct NeverTrading;
        impl AssetKind for NeverTrading {
            fn default_profile() -> AssetProfile {
                AssetProfile {
                    timezone_name: "UTC",
                    restriction: TradingRestriction::never(),
                    min_price_increment: dec!(0.01),
                    min_size_increment: dec!(1),
                }
            }
        }
        AssetRegistry::reset::<NeverTrading>();
        let restricted_asset = AssetRegistry::get::<NeverTrading>("RESTRICTED");

        let data_adapter = Arc::new(MockMarketDataAdapter::new());
        let native = Frequency::parse("1min").unwrap();
        let cache = Arc::new(BarCache::new("RESTRICTED", native, data_adapter));

        let broker = Arc::new(MockBrokerAdapter::new(Account::new(dec!(100_000), dec!(100_000))));
        let policy = DualSupertrendPolicy::new(
            broker,
            DualSupertrendParams {
                short_n: 10,
                short_k: dec!(3),
                long_n: 20,
                long_k: dec!(5),
                risk_multiplier: dec!(1),
            },
            TradeConfig::new(dec!(1), dec!(50), dec!(2)),
            BracketStyle::Oco,
        );

        let bar = trending_bar(0, dec!(100));
        policy.on_bar(&restricted_asset, &cache, native, bar).await.unwrap();
    }
}
