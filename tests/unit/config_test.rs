//! Tests for configuration validation

use todo_taskq::config::{AppConfig, ConfigError, RateLimitConfig, WorkerPoolConfig};

#[test]
fn test_worker_pool_config_validation() {
    assert!(WorkerPoolConfig::new().validate().is_ok());
    assert!(WorkerPoolConfig::new().with_worker_count(0).validate().is_err());
    assert!(WorkerPoolConfig::new().with_queue_capacity(0).validate().is_err());
    assert!(WorkerPoolConfig::new().with_thread_stack_size(1024).validate().is_err());
}

#[test]
fn test_rate_limit_config_validation() {
    let valid = RateLimitConfig { limit: 2, window_secs: 1 };
    assert!(valid.validate().is_ok());
    assert_eq!(valid.window().as_secs(), 1);
    assert!(RateLimitConfig { limit: 0, window_secs: 1 }.validate().is_err());
    assert!(RateLimitConfig { limit: 2, window_secs: 0 }.validate().is_err());
}

#[test]
fn test_app_config_requires_jwt_secret() {
    let err = AppConfig::from_json_str("{}").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_app_config_partial_document_uses_defaults() {
    let cfg = AppConfig::from_json_str(
        r#"{
            "auth": {"jwt_secret": "s"},
            "workers": {"worker_count": 5},
            "rate_limit": {"limit": 2, "window_secs": 1}
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.workers.worker_count, 5);
    assert_eq!(cfg.workers.queue_capacity, 10);
    assert_eq!(cfg.rate_limit.limit, 2);
    assert_eq!(cfg.server.bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.auth.token_ttl_secs, 86_400);
    assert_eq!(cfg.auth.password_cost, 10);
}

#[test]
fn test_app_config_rejects_out_of_range_password_cost() {
    let err = AppConfig::from_json_str(r#"{"auth": {"jwt_secret": "s", "password_cost": 3}}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("password_cost")));
}

#[test]
fn test_app_config_rejects_malformed_json() {
    assert!(matches!(AppConfig::from_json_str("{"), Err(ConfigError::Parse(_))));
}

#[test]
fn test_app_config_from_missing_file() {
    let err = AppConfig::from_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
