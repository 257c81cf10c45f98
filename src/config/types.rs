use serde::Deserialize;

/// Main configuration structure for Tumblr-Harvest
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub harvest: HarvestConfig,
    pub output: OutputConfig,
}

/// Blog API client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root URL of the API, e.g. `https://api.tumblr.com/`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt for transport failures
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds)
    #[serde(rename = "retry-interval-ms")]
    pub retry_interval_ms: u64,

    /// Multiplier applied to the retry delay after each attempt
    #[serde(rename = "backoff-factor")]
    pub backoff_factor: u32,

    /// Whether a non-success status aborts the run or is logged and skipped
    #[serde(rename = "raise-errors")]
    pub raise_errors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tumblr.com/".to_string(),
            timeout_secs: 30,
            max_retries: 5,
            retry_interval_ms: 50,
            backoff_factor: 2,
            raise_errors: true,
        }
    }
}

/// Harvester defaults, overridable per run from the command line
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Pause between page requests (milliseconds)
    #[serde(rename = "interval-ms")]
    pub interval_ms: u64,

    /// Rewrite posts that already exist instead of stopping at them
    pub overwrite: bool,

    /// Number of posts requested per page
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Ask the API to include reblog information in each post
    #[serde(rename = "reblog-info")]
    pub reblog_info: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            interval_ms: 0,
            overwrite: false,
            page_size: 20,
            reblog_info: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory that receives one sub-directory per blog
    pub directory: Option<String>,
}
