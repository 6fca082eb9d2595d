//! Shared helpers for tests that talk to a mock Canvas server

#![allow(dead_code)]

use canvas_sync::adapters::canvas::CanvasGateway;
use canvas_sync::config::{secret_string, CanvasConfig};
use mockito::Matcher;
use serde_json::Value;

pub const TEST_TOKEN: &str = "test-token";

/// Canvas settings pointed at `base_url` with no pacing and fast retries
pub fn test_canvas_config(base_url: &str) -> CanvasConfig {
    let mut config = CanvasConfig::new(base_url, secret_string(TEST_TOKEN.to_string()));
    config.rate_limit.min_interval_ms = 0;
    config.retry.max_retries = 2;
    config.retry.initial_delay_ms = 1;
    config.retry.max_delay_ms = 5;
    config
}

pub fn test_gateway(base_url: &str) -> CanvasGateway {
    CanvasGateway::new(&test_canvas_config(base_url)).expect("gateway")
}

/// Matches a query that carries every given pair (array keys included)
pub fn query(pairs: &[(&str, &str)]) -> Matcher {
    if pairs.is_empty() {
        return Matcher::Any;
    }
    Matcher::AllOf(
        pairs
            .iter()
            .map(|(k, v)| Matcher::UrlEncoded((*k).to_string(), (*v).to_string()))
            .collect(),
    )
}

pub fn json_body(value: Value) -> String {
    serde_json::to_string(&value).expect("json")
}
