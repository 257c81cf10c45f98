//! HTTP client for the Tumblr v2 API
//!
//! This module handles:
//! - Building the reqwest client with JSON headers and timeouts
//! - Signing requests (OAuth 1.0a) or attaching the bare API key
//! - Retrying transport failures with exponential backoff
//! - Unwrapping the `{meta, response}` envelope and classifying errors

use crate::api::oauth::OAuthSigner;
use crate::api::types::{BlogInfo, Page, PageParams};
use crate::api::BlogApi;
use crate::config::{ApiConfig, Credentials};
use crate::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Retry schedule for transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry
    pub interval: Duration,

    /// Multiplier applied to the delay after each retry
    pub backoff_factor: u32,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (zero-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.backoff_factor.saturating_pow(retry);
        self.interval.saturating_mul(factor)
    }
}

impl From<&ApiConfig> for RetryPolicy {
    fn from(config: &ApiConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            interval: Duration::from_millis(config.retry_interval_ms),
            backoff_factor: config.backoff_factor,
        }
    }
}

/// Blog API client backed by reqwest
pub struct TumblrClient {
    http: Client,
    base_url: Url,
    api_key: String,
    signer: Option<OAuthSigner>,
    retry: RetryPolicy,
    raise_errors: bool,
}

impl TumblrClient {
    /// Creates a client from the API configuration and credentials
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tumblr_harvest::config::{ApiConfig, Credentials};
    /// use tumblr_harvest::TumblrClient;
    ///
    /// let credentials = Credentials::from_env().unwrap();
    /// let client = TumblrClient::new(&ApiConfig::default(), credentials).unwrap();
    /// ```
    pub fn new(config: &ApiConfig, credentials: Credentials) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(concat!("tumblr-harvest/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|source| HarvestError::Transport {
                url: base_url.to_string(),
                source,
            })?;

        let signer = OAuthSigner::from_credentials(&credentials)?;
        if signer.is_none() {
            tracing::debug!("Incomplete OAuth credentials, sending api_key only");
        }

        Ok(Self {
            http,
            base_url,
            api_key: credentials.consumer_key,
            signer,
            retry: RetryPolicy::from(config),
            raise_errors: config.raise_errors,
        })
    }

    /// Issues a GET and returns the envelope's `response` object
    ///
    /// A non-success status is an [`HarvestError::Upstream`] when `raise` is
    /// set; otherwise it is logged and `None` is returned.
    pub async fn get_body(
        &self,
        path: &str,
        query: &[(String, String)],
        raise: bool,
    ) -> Result<Option<Value>> {
        let url = self.base_url.join(path)?;
        let response = self.send_with_retry(&url, query).await?;
        let status = response.status();

        let body = response.text().await.map_err(|source| HarvestError::Transport {
            url: url.to_string(),
            source: source.without_url(),
        })?;

        if !status.is_success() {
            let message = upstream_message(&body);
            if raise {
                return Err(HarvestError::Upstream {
                    status: status.as_u16(),
                    path: path.to_string(),
                    message,
                });
            }
            tracing::warn!("Error {} for {}: {}", status.as_u16(), path, message);
            return Ok(None);
        }

        let mut envelope: Value = serde_json::from_str(&body).map_err(|e| HarvestError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        match envelope.get_mut("response").map(Value::take) {
            Some(response) => Ok(Some(response)),
            None => Err(HarvestError::Decode {
                path: path.to_string(),
                message: "missing response object".to_string(),
            }),
        }
    }

    async fn send_with_retry(&self, url: &Url, query: &[(String, String)]) -> Result<Response> {
        let mut retry = 0;
        loop {
            match self.send_once(url, query).await {
                Ok(response) => return Ok(response),
                Err(e) if is_transient(&e) && retry < self.retry.max_retries => {
                    let e = e.without_url();
                    let delay = self.retry.delay_for(retry);
                    tracing::debug!(
                        "Transient failure for {} ({}), retry {} in {:?}",
                        url,
                        e,
                        retry + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                // The request URL may carry api_key; only the bare endpoint is kept
                Err(source) => {
                    return Err(HarvestError::Transport {
                        url: url.to_string(),
                        source: source.without_url(),
                    })
                }
            }
        }
    }

    async fn send_once(
        &self,
        url: &Url,
        query: &[(String, String)],
    ) -> std::result::Result<Response, reqwest::Error> {
        let mut request = self.http.get(url.clone()).header(ACCEPT, "application/json");

        match &self.signer {
            Some(signer) => {
                let nonce = uuid::Uuid::new_v4().simple().to_string();
                let timestamp = chrono::Utc::now().timestamp();
                let authorization = signer.authorization("GET", url, query, &nonce, timestamp);
                request = request.query(query).header(AUTHORIZATION, authorization);
            }
            None => {
                request = request
                    .query(query)
                    .query(&[("api_key", self.api_key.as_str())]);
            }
        }

        tracing::trace!("GET {} {:?}", url, query);
        request.send().await
    }
}

#[async_trait]
impl BlogApi for TumblrClient {
    async fn get_blog_info(&self, blog_id: &str) -> Result<BlogInfo> {
        let path = format!("v2/blog/{}/info", full_blog_id(blog_id));
        let body = self
            .get_body(&path, &[], true)
            .await?
            .ok_or_else(|| HarvestError::Decode {
                path: path.clone(),
                message: "empty response".to_string(),
            })?;
        BlogInfo::from_json(body).map_err(|message| HarvestError::Decode { path, message })
    }

    async fn get_page(&self, blog_id: &str, params: &PageParams) -> Result<Page> {
        let path = format!("v2/blog/{}/posts", full_blog_id(blog_id));
        match self.get_body(&path, &params.to_query(), self.raise_errors).await? {
            Some(body) => serde_json::from_value(body).map_err(|e| HarvestError::Decode {
                path,
                message: e.to_string(),
            }),
            None => Ok(Page::default()),
        }
    }
}

/// Expands a short blog name into its host name
///
/// Names containing `.` (custom domains) or `:` (`t:` UUIDs) are already
/// fully qualified.
pub fn full_blog_id(blog_id: &str) -> String {
    if blog_id.contains('.') || blog_id.contains(':') {
        blog_id.to_string()
    } else {
        format!("{blog_id}.tumblr.com")
    }
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect()
}

/// Pulls `meta.msg` (and any `errors[].detail`) out of an error body
fn upstream_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().chars().take(200).collect();
    };

    let msg = value
        .pointer("/meta/msg")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");

    let detail = value
        .pointer("/errors/0/detail")
        .and_then(Value::as_str);

    match detail {
        Some(detail) => format!("{msg} ({detail})"),
        None => msg.to_string(),
    }
}
