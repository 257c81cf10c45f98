//! Integration tests for the API client and full scrapes
//!
//! These tests use wiremock to stand in for the blog API.

mod client_tests;
mod scrape_tests;

use tumblr_harvest::config::{ApiConfig, Credentials};
use tumblr_harvest::TumblrClient;

/// API configuration pointing at a mock server, with fast retries
pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        max_retries: 0,
        retry_interval_ms: 1,
        backoff_factor: 2,
        raise_errors: true,
    }
}

pub fn key_only() -> Credentials {
    Credentials {
        consumer_key: "test-key".to_string(),
        ..Credentials::default()
    }
}

pub fn full_credentials() -> Credentials {
    Credentials {
        consumer_key: "test-key".to_string(),
        consumer_secret: Some("test-secret".to_string()),
        oauth_token: Some("test-token".to_string()),
        oauth_token_secret: Some("test-token-secret".to_string()),
    }
}

pub fn client_for(base_url: &str) -> TumblrClient {
    TumblrClient::new(&api_config(base_url), key_only()).expect("Failed to build client")
}

/// Wraps a response object in the API envelope
pub fn envelope(response: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "meta": {"status": 200, "msg": "OK"},
        "response": response
    })
}
