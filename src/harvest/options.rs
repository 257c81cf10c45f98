//! Harvester configuration: defaults fixed at construction, per-run overrides
//!
//! The two layers are merged functionally by [`HarvestDefaults::resolve`];
//! neither layer is mutated by a run.

use crate::api::{PageParams, PostId};
use crate::config::{validate_page_size, HarvestConfig};
use crate::{ConfigError, ConfigResult};
use std::collections::BTreeMap;
use std::time::Duration;

/// Pass-through keys that would add a second pagination mode to the
/// `before_id` walk
const CONFLICTING_PAGINATION_KEYS: &[&str] = &["offset", "before"];

/// Pass-through keys that shadow a typed option
const RESERVED_KEYS: &[&str] = &["before_id", "limit", "reblog_info"];

/// Harvester-level defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestDefaults {
    pub interval: Duration,
    pub overwrite: bool,
    pub page_size: u32,
    pub include_reblog_info: bool,
}

impl Default for HarvestDefaults {
    fn default() -> Self {
        Self {
            interval: Duration::ZERO,
            overwrite: false,
            page_size: 20,
            include_reblog_info: true,
        }
    }
}

impl From<&HarvestConfig> for HarvestDefaults {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            overwrite: config.overwrite,
            page_size: config.page_size,
            include_reblog_info: config.reblog_info,
        }
    }
}

/// Per-run overrides; unset fields fall back to [`HarvestDefaults`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestOptions {
    /// Minimum pause between page requests
    pub interval: Option<Duration>,

    /// Rewrite existing artifacts instead of stopping at the first one
    pub overwrite: Option<bool>,

    /// Start the walk below this post instead of at the newest
    pub before_id: Option<PostId>,

    /// Posts requested per page
    pub page_size: Option<u32>,

    /// Forwarded as `reblog_info`
    pub include_reblog_info: Option<bool>,

    /// Extra transport parameters, forwarded verbatim
    pub extra: BTreeMap<String, String>,
}

impl HarvestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = Some(overwrite);
        self
    }

    pub fn with_before_id(mut self, before_id: impl Into<PostId>) -> Self {
        self.before_id = Some(before_id.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_reblog_info(mut self, include: bool) -> Self {
        self.include_reblog_info = Some(include);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub interval: Duration,
    pub overwrite: bool,
    /// Parameters of the first request
    pub params: PageParams,
}

impl HarvestDefaults {
    /// Merges per-run overrides over these defaults and validates the result
    ///
    /// Fails with [`ConfigError::InvalidPagination`] if the pass-through
    /// parameters would mix offset or timestamp pagination into the cursor
    /// walk, or shadow a typed option; and with [`ConfigError::Validation`]
    /// for an out-of-range page size.
    pub fn resolve(&self, options: &HarvestOptions) -> ConfigResult<RunSettings> {
        validate_extra(&options.extra)?;

        let page_size = options.page_size.unwrap_or(self.page_size);
        validate_page_size(page_size)?;

        Ok(RunSettings {
            interval: options.interval.unwrap_or(self.interval),
            overwrite: options.overwrite.unwrap_or(self.overwrite),
            params: PageParams {
                before_id: options.before_id.clone(),
                limit: page_size,
                reblog_info: options
                    .include_reblog_info
                    .unwrap_or(self.include_reblog_info),
                extra: options.extra.clone(),
            },
        })
    }
}

fn validate_extra(extra: &BTreeMap<String, String>) -> ConfigResult<()> {
    let conflicting: Vec<&str> = CONFLICTING_PAGINATION_KEYS
        .iter()
        .copied()
        .filter(|key| extra.contains_key(*key))
        .collect();
    if !conflicting.is_empty() {
        return Err(ConfigError::InvalidPagination(format!(
            "{} cannot be combined with before_id cursor pagination",
            conflicting.join(" and ")
        )));
    }

    if let Some(key) = RESERVED_KEYS.iter().find(|key| extra.contains_key(**key)) {
        return Err(ConfigError::InvalidPagination(format!(
            "'{}' must be set through its typed option, not as a pass-through parameter",
            key
        )));
    }

    Ok(())
}
