//! Wires the mock market-data adapter and mock broker into the dual-Supertrend
//! reference policy and lets the strategy driver run it against a handful of
//! synthetic bars.
//!
//! Not built by `cargo build`; run it with `cargo run --example dual_supertrend`
//! after copying it into an `examples/` directory of a consuming project, or
//! adapt it into a binary target.

use std::sync::Arc;
use std::time::Duration;

use ferrotrade::{
    Asset, AssetKind, AssetProfile, AssetRegistry, Bar, BarCache, BracketStyle, Frequency,
    StrategyDriver, TradeConfig, TradingRestriction,
};
use ferrotrade_data::adapter::mock::MockMarketDataAdapter;
use ferrotrade_execution::broker::mock::{FillBehaviour, MockBrokerAdapter};
use ferrotrade_execution::Account;
use ferrotrade_strategy::{DualSupertrendParams, DualSupertrendPolicy};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct Equity;

impl AssetKind for Equity {
    fn default_profile() -> AssetProfile {
        AssetProfile {
            timezone_name: "America/New_York",
            restriction: TradingRestriction::always(),
            min_price_increment: dec!(0.01),
            min_size_increment: dec!(1),
        }
    }
}

fn minute(n: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(n * 60, 0).expect("in-range timestamp")
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let native = Frequency::parse("1min").expect("valid frequency literal");
    let asset: Arc<Asset<Equity>> = AssetRegistry::get::<Equity>("DEMO");

    let data_adapter = Arc::new(MockMarketDataAdapter::new());
    let seed_bars: Vec<Bar> = (0..120)
        .map(|i| {
            let price = Decimal::from(100 + i) + Decimal::new((i % 5) as i64, 1);
            Bar {
                start: minute(i),
                open: price,
                high: price + dec!(0.5),
                low: price - dec!(0.5),
                close: price,
                volume: dec!(1000),
                price,
                trade_count: None,
            }
        })
        .collect();
    data_adapter.seed("DEMO", seed_bars.clone());

    let cache = Arc::new(BarCache::new("DEMO", native, Arc::clone(&data_adapter)));
    cache
        .get(minute(0), minute(119), native, 0)
        .await
        .expect("seeded range is covered");

    let broker = Arc::new(MockBrokerAdapter::new(Account::new(dec!(1_000_000), dec!(1_000_000))));
    broker.set_fill_behaviour("DEMO", FillBehaviour::FullFillAt(dec!(150)));

    let policy = Arc::new(DualSupertrendPolicy::new(
        Arc::clone(&broker),
        DualSupertrendParams {
            short_n: 10,
            short_k: dec!(3),
            long_n: 20,
            long_k: dec!(5),
            risk_multiplier: dec!(1),
        },
        TradeConfig::new(dec!(1), dec!(25), dec!(2)),
        BracketStyle::Oco,
    ));

    let driver = StrategyDriver::new();
    driver.run(vec![(asset, Arc::clone(&cache), native)], policy);

    tokio::time::sleep(Duration::from_millis(50)).await;

    driver.stop().await;
    tracing::info!("demo run complete");
}
