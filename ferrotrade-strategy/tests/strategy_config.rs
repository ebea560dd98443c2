use ferrotrade_strategy::{StrategyConfig, StrategyId, StrategyRegistry};

#[test]
fn strategy_config_loads_its_frequency_and_parameters() {
    let json = r#"{
        "id": "dual-supertrend-aapl",
        "freq": "5min",
        "parameters": {"short_n": 10, "long_n": 20, "risk_multiplier": 1.5}
    }"#;
    let config: StrategyConfig = serde_json::from_str(json).expect("valid config document");
    assert_eq!(config.id, StrategyId::new("dual-supertrend-aapl"));
    assert_eq!(config.frequency().expect("valid frequency").to_string(), "5min");

    #[derive(serde::Deserialize)]
    struct Params {
        short_n: u32,
        long_n: u32,
    }
    let params: Params = config.parameters_as().expect("parameters deserialize");
    assert_eq!(params.short_n, 10);
    assert_eq!(params.long_n, 20);
}

#[test]
fn registry_keeps_each_strategy_instance_distinct() {
    let mut registry: StrategyRegistry<u32> = StrategyRegistry::new();
    let a = StrategyId::new("a");
    let b = StrategyId::new("b");
    registry.register(a.clone(), 1);
    registry.register(b.clone(), 2);

    assert_eq!(registry.get(&a), Some(&1));
    assert_eq!(registry.get(&b), Some(&2));
    assert_eq!(registry.remove(&a), Some(1));
    assert!(registry.get(&a).is_none());
}
