//! Environment-supplied settings: API credentials and the output root

use crate::config::types::OutputConfig;
use crate::ConfigError;
use std::path::PathBuf;

/// API credentials read from the environment
///
/// Only the consumer key is mandatory. Requests are signed when the secret
/// and both token halves are also present; otherwise the key is sent as a
/// plain `api_key` parameter, which is enough for public blog reads.
#[derive(Clone, Default)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: Option<String>,
    pub oauth_token: Option<String>,
    pub oauth_token_secret: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("signed", &self.can_sign())
            .finish()
    }
}

impl Credentials {
    /// Reads credentials from the process environment, loading `.env` first
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads credentials through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let consumer_key =
            non_empty("CONSUMER_KEY").ok_or_else(|| ConfigError::MissingEnv("CONSUMER_KEY".into()))?;

        Ok(Self {
            consumer_key,
            consumer_secret: non_empty("CONSUMER_SECRET"),
            oauth_token: non_empty("OAUTH_TOKEN"),
            oauth_token_secret: non_empty("OAUTH_TOKEN_SECRET"),
        })
    }

    /// Returns true if every value needed for OAuth signing is present
    pub fn can_sign(&self) -> bool {
        self.consumer_secret.is_some() && self.oauth_token.is_some() && self.oauth_token_secret.is_some()
    }
}

/// Resolves the directory that receives one sub-directory per blog
///
/// `OUTPUT_DIRECTORY` wins when set and non-empty, then the config file,
/// then `~/Downloads/Tumblr`.
pub fn resolve_output_root(config: &OutputConfig) -> Result<PathBuf, ConfigError> {
    resolve_output_root_with(config, |key| std::env::var(key).ok())
}

/// [`resolve_output_root`] with an explicit environment lookup
pub fn resolve_output_root_with<F>(config: &OutputConfig, lookup: F) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup("OUTPUT_DIRECTORY").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    if let Some(dir) = &config.directory {
        return Ok(PathBuf::from(dir));
    }

    let base = directories::BaseDirs::new().ok_or_else(|| {
        ConfigError::Validation(
            "no home directory found; set OUTPUT_DIRECTORY or output.directory".to_string(),
        )
    })?;
    Ok(base.home_dir().join("Downloads").join("Tumblr"))
}
