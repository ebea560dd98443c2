use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rust_decimal::Decimal;
use smol_str::SmolStr;

use crate::restriction::TradingRestriction;

/// Plain-data bundle describing how a concrete asset kind trades: its
/// timezone, trading-restriction predicate and tick sizes.
///
/// Carried by composition on [`Asset`] rather than via inheritance, so a new
/// asset kind is just a function returning one of these, not a subclass.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetProfile {
    pub timezone_name: &'static str,
    pub restriction: TradingRestriction,
    pub min_price_increment: Decimal,
    pub min_size_increment: Decimal,
}

/// Marker for a concrete asset kind (e.g. `UsEquity`, `Crypto`) that
/// supplies the default [`AssetProfile`] for every symbol of that kind.
pub trait AssetKind: Send + Sync + 'static {
    fn default_profile() -> AssetProfile;
}

/// A single tradable instrument: a symbol plus its [`AssetProfile`].
///
/// `Asset<K1>("AAPL")` and `Asset<K2>("AAPL")` are always distinct instances
/// even when `K1 != K2`, because each kind owns its own registry.
#[derive(Debug)]
pub struct Asset<K> {
    symbol: SmolStr,
    profile: AssetProfile,
    _kind: std::marker::PhantomData<K>,
}

impl<K> Asset<K> {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn profile(&self) -> &AssetProfile {
        &self.profile
    }

    pub fn truncate_price(&self, price: Decimal) -> Decimal {
        truncate_to_increment(price, self.profile.min_price_increment)
    }

    pub fn truncate_size(&self, size: Decimal) -> Decimal {
        truncate_to_increment(size, self.profile.min_size_increment)
    }
}

fn truncate_to_increment(value: Decimal, increment: Decimal) -> Decimal {
    if increment.is_zero() {
        return value;
    }
    (value / increment).trunc() * increment
}

type KindRegistry<K> = Mutex<HashMap<SmolStr, Arc<Asset<K>>>>;

/// Process-wide singleton asset registry, one map per concrete [`AssetKind`].
///
/// Indexed by `TypeId` rather than a generic `static`, so every `K` gets an
/// isolated map without the caller needing to register kinds up front --
/// the same singleton-per-concrete-class guarantee as the original's
/// metaclass-based registry, implemented with a type-keyed lock instead.
pub struct AssetRegistry;

fn registries() -> &'static Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>> {
    static REGISTRIES: OnceLock<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>> =
        OnceLock::new();
    REGISTRIES.get_or_init(|| Mutex::new(HashMap::new()))
}

fn with_kind_registry<K: AssetKind, R>(f: impl FnOnce(&KindRegistry<K>) -> R) -> R {
    let mut top = registries().lock();
    let boxed = top
        .entry(TypeId::of::<K>())
        .or_insert_with(|| Box::new(KindRegistry::<K>::new(HashMap::new())));
    let registry = boxed
        .downcast_ref::<KindRegistry<K>>()
        .expect("registry is always inserted keyed by its own TypeId");
    f(registry)
}

impl AssetRegistry {
    /// Fetch the asset for `symbol`, constructing it from `K::default_profile`
    /// on first lookup and returning the same `Arc` on every subsequent call.
    pub fn get<K: AssetKind>(symbol: &str) -> Arc<Asset<K>> {
        with_kind_registry::<K, _>(|registry| {
            let mut guard = registry.lock();
            if let Some(existing) = guard.get(symbol) {
                return Arc::clone(existing);
            }
            let asset = Arc::new(Asset {
                symbol: SmolStr::new(symbol),
                profile: K::default_profile(),
                _kind: std::marker::PhantomData,
            });
            guard.insert(SmolStr::new(symbol), Arc::clone(&asset));
            asset
        })
    }

    /// Test-only: clear every entry for `K`, so singleton-identity tests
    /// don't leak state across test cases.
    #[cfg(test)]
    pub fn reset<K: AssetKind>() {
        with_kind_registry::<K, _>(|registry| registry.lock().clear());
    }
}
