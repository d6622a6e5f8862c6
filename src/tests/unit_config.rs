use crate::config::WikiConfig;
use crate::error::WikiError;
use std::collections::HashMap;
use std::time::Duration;

fn config_from(pairs: &[(&str, &str)]) -> Result<WikiConfig, WikiError> {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    WikiConfig::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn test_defaults() {
    let config = config_from(&[]).expect("Defaults should be valid");

    assert_eq!(config.max_connections, 30);
    assert_eq!(config.http_instances, 2);
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.database_driver, "sqlite");
    assert_eq!(config.wikidb_queue, "wikidb.queue");
    assert!(config.sql_queries_file.is_none());
}

#[test]
fn test_overrides() {
    let config = config_from(&[
        ("DATABASE_URL", "sqlite://other.db"),
        ("MAX_CONNECTIONS", "5"),
        ("POOL_ACQUIRE_TIMEOUT_SECS", "3"),
        ("HTTP_INSTANCES", "4"),
        ("HTTP_PORT", " 9090 "),
        ("SQL_QUERIES_FILE", "./queries.json"),
    ])
    .unwrap();

    assert_eq!(config.database_url, "sqlite://other.db");
    assert_eq!(config.max_connections, 5);
    assert_eq!(config.acquire_timeout, Duration::from_secs(3));
    assert_eq!(config.http_instances, 4);
    assert_eq!(config.http_port, 9090);
    assert_eq!(config.pool_settings().max_connections, 5);
    assert!(config.sql_queries_file.is_some());
}

// a typo in a number should stop startup, not quietly fall back to a default
#[test]
fn test_unparseable_numbers_are_rejected() {
    let result = config_from(&[("HTTP_PORT", "eighty")]);
    match result {
        Err(WikiError::Config(msg)) => assert!(msg.contains("HTTP_PORT")),
        other => panic!("expected a config error, got {:?}", other),
    }
}

#[test]
fn test_zero_instances_or_connections_are_rejected() {
    assert!(config_from(&[("HTTP_INSTANCES", "0")]).is_err());
    assert!(config_from(&[("MAX_CONNECTIONS", "0")]).is_err());
}

#[test]
fn test_unsupported_driver_is_rejected() {
    let result = config_from(&[("DATABASE_DRIVER", "org.hsqldb.jdbcDriver")]);
    assert!(matches!(result, Err(WikiError::Config(_))));
}
