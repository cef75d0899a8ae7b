//! Configuration Serialization Tests
//!
//! Executor settings and delegate policies can live in configuration files.

use tether_core::{BindingExecutor, DrainOrder, ExecutorConfig, Priority, ReturnPolicy};

#[test]
fn executor_config_round_trips_through_json() {
    let config = ExecutorConfig::manual().with_drain_order(DrainOrder::Lifo);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(json, r#"{"drain_order":"lifo","auto_run":false}"#);

    let back: ExecutorConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn missing_fields_take_defaults() {
    let config: ExecutorConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, ExecutorConfig::default());

    let config: ExecutorConfig = serde_json::from_str(r#"{"auto_run":false}"#).unwrap();
    assert_eq!(config.drain_order, DrainOrder::Fifo);
    assert!(!config.auto_run);
}

#[test]
fn loaded_config_drives_executor() {
    let config: ExecutorConfig = serde_json::from_str(r#"{"auto_run":false}"#).unwrap();
    let executor = BindingExecutor::with_config(config);
    assert!(!executor.config().auto_run);
}

#[test]
fn policies_use_snake_case_names() {
    assert_eq!(
        serde_json::to_string(&Priority::ArgumentGuard).unwrap(),
        r#""argument_guard""#
    );
    assert_eq!(
        serde_json::from_str::<Priority>(r#""post_utility""#).unwrap(),
        Priority::PostUtility
    );
    assert_eq!(
        serde_json::from_str::<ReturnPolicy>(r#""inverse_child""#).unwrap(),
        ReturnPolicy::InverseChild
    );
    assert!(serde_json::from_str::<ReturnPolicy>(r#""sometimes""#).is_err());
}
