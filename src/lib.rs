//! Tumblr-Harvest: incremental blog post downloader
//!
//! This crate walks a blog's post listing backwards through history with an
//! opaque `before_id` cursor, writes every post to its own JSON file, and
//! stops as soon as it reaches posts that were saved by an earlier run.

pub mod api;
pub mod config;
pub mod harvest;
pub mod metadata;
pub mod scrape;
pub mod store;

use thiserror::Error;

/// Main error type for Tumblr-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Upstream error {status} for {path}: {message}")]
    Upstream {
        status: u16,
        path: String,
        message: String,
    },

    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Malformed response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] store::StoreError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid pagination arguments: {0}")]
    InvalidPagination(String),

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Tumblr-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use api::{BlogApi, BlogInfo, Page, Post, PostId, TumblrClient};
pub use config::Config;
pub use harvest::{HarvestDefaults, HarvestOptions, HarvestOutcome, Harvester, StopReason};
pub use metadata::{fetch_blog_metadata, BlogRef};
pub use scrape::{ScrapeInfo, Scraper};
pub use store::{FsPostStore, PostStore};
