use crate::api::PageParams;
use crate::harvest::{HarvestOutcome, StopReason};
use crate::metadata::BlogRef;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Run summary written to `scrape_info.json`
///
/// Written once as a placeholder before the walk and again once it ends, so
/// an interrupted run still leaves the start time and blog on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeInfo {
    pub blog: BlogRef,

    pub scrape_start: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape_end: Option<DateTime<Utc>>,

    /// Parameters of the last page request, for resuming by hand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_args: Option<PageParams>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts_fetched: Option<u64>,

    /// Post count from the blog metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_posts: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
}

impl ScrapeInfo {
    /// The placeholder written before any post is fetched
    pub fn started(blog: BlogRef, scrape_start: DateTime<Utc>) -> Self {
        Self {
            blog,
            scrape_start,
            scrape_end: None,
            end_args: None,
            posts_fetched: None,
            total_posts: None,
            stop_reason: None,
        }
    }

    /// Fills in the results of a finished walk
    pub fn finish(&mut self, outcome: HarvestOutcome, total_posts: u64, scrape_end: DateTime<Utc>) {
        self.scrape_end = Some(scrape_end);
        self.posts_fetched = Some(outcome.posts_fetched);
        self.total_posts = Some(total_posts);
        self.stop_reason = Some(outcome.stop_reason);
        self.end_args = Some(outcome.last_params);
    }

    pub fn is_finished(&self) -> bool {
        self.scrape_end.is_some()
    }
}
