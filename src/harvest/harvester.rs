//! Backward pagination walk over a blog's posts
//!
//! One request is in flight at a time. Each page is split by the pinned
//! policy, its posts are persisted newest-first, and the walk ends on an
//! empty page, on the first already-saved post (unless overwriting), or on a
//! page shorter than requested.

use crate::api::{BlogApi, PageParams, PostId};
use crate::harvest::options::{HarvestDefaults, HarvestOptions};
use crate::harvest::pinned::{PinnedPolicy, RepeatedPinnedFilter};
use crate::harvest::progress::{HarvestProgress, ProgressFn};
use crate::store::PostStore;
use crate::Result;
use serde::Serialize;
use std::path::Path;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The API returned a page with no posts
    Exhausted,

    /// A post was already saved and overwriting is off
    DuplicateFound,

    /// Fewer posts than requested came back
    ShortPage,
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarvestOutcome {
    /// Non-pinned posts written during this run
    pub posts_fetched: u64,

    /// Non-pinned posts received, written or not
    pub posts_seen: u64,

    /// Page requests issued
    pub pages_fetched: u64,

    /// Id of the pinned post saved from the first page
    pub pinned: Option<PostId>,

    pub stop_reason: StopReason,

    /// Parameters of the last request
    pub last_params: PageParams,
}

/// Mutable state of one run, never shared between runs
struct RunState {
    posts_fetched: u64,
    posts_seen: u64,
    pages_fetched: u64,
    pinned: Option<PostId>,
    params: PageParams,
}

/// Drives the pagination walk
pub struct Harvester<A, S> {
    api: A,
    store: S,
    defaults: HarvestDefaults,
    pinned_policy: Box<dyn PinnedPolicy>,
    progress: Option<ProgressFn>,
}

impl<A: BlogApi, S: PostStore> Harvester<A, S> {
    /// Creates a harvester with the default pinned-post policy
    pub fn new(api: A, store: S, defaults: HarvestDefaults) -> Self {
        Self {
            api,
            store,
            defaults,
            pinned_policy: Box::new(RepeatedPinnedFilter),
            progress: None,
        }
    }

    /// Replaces the pinned-post policy
    pub fn with_pinned_policy(mut self, policy: impl PinnedPolicy + 'static) -> Self {
        self.pinned_policy = Box::new(policy);
        self
    }

    /// Registers a callback invoked once per page
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&HarvestProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn defaults(&self) -> &HarvestDefaults {
        &self.defaults
    }

    /// Walks `blog_id`'s posts backwards, saving each into `destination`
    ///
    /// Options are validated before any request is made. Any API or storage
    /// failure aborts the run; the cursor in effect is logged so the walk can
    /// be resumed with `before_id`.
    pub async fn harvest(
        &self,
        blog_id: &str,
        destination: &Path,
        options: &HarvestOptions,
    ) -> Result<HarvestOutcome> {
        let settings = self.defaults.resolve(options)?;

        tracing::info!(
            "Harvesting {} into {} (page size {}, overwrite {})",
            blog_id,
            destination.display(),
            settings.params.limit,
            settings.overwrite
        );

        let mut state = RunState {
            posts_fetched: 0,
            posts_seen: 0,
            pages_fetched: 0,
            pinned: None,
            params: settings.params,
        };

        let stop_reason = loop {
            let page = match self.api.get_page(blog_id, &state.params).await {
                Ok(page) => page,
                Err(e) => {
                    log_abort(&state.params, &e);
                    return Err(e);
                }
            };
            state.pages_fetched += 1;
            let first_page = state.pages_fetched == 1;

            if page.posts.is_empty() {
                tracing::debug!("Empty page, history exhausted");
                break StopReason::Exhausted;
            }

            let split = self.pinned_policy.split(page.posts, first_page);

            if let Some(pinned) = split.pinned {
                self.store
                    .write(destination, pinned.id(), pinned.payload(), true)
                    .inspect_err(|e| log_abort(&state.params, e))?;
                tracing::debug!("Saved pinned post {}", pinned.id());
                state.pinned = Some(pinned.id().clone());
            }

            let posts = split.posts;
            state.posts_seen += posts.len() as u64;

            let progress = HarvestProgress {
                page: state.pages_fetched,
                seen: state.posts_seen,
                total: page.total_posts,
                cursor: state.params.before_id.clone(),
            };
            tracing::debug!(
                "Page {}: {} posts ({} / {} seen), before_id: {:?}",
                progress.page,
                posts.len(),
                progress.seen,
                progress.total,
                progress.cursor.as_ref().map(PostId::as_str)
            );
            if let Some(callback) = &self.progress {
                callback(&progress);
            }

            let mut duplicate_found = false;
            for post in &posts {
                let written = self
                    .store
                    .write(destination, post.id(), post.payload(), settings.overwrite)
                    .inspect_err(|e| log_abort(&state.params, e))?;
                if !written {
                    tracing::info!("Post {} already saved, stopping", post.id());
                    duplicate_found = true;
                    break;
                }
                state.posts_fetched += 1;
            }

            if duplicate_found && !settings.overwrite {
                break StopReason::DuplicateFound;
            }
            if (posts.len() as u64) < u64::from(state.params.limit) {
                break StopReason::ShortPage;
            }

            if !settings.interval.is_zero() {
                tokio::time::sleep(settings.interval).await;
            }
            state.params.before_id = posts.last().map(|post| post.id().clone());
        };

        tracing::info!(
            "Harvest of {} finished ({:?}): {} posts written over {} pages",
            blog_id,
            stop_reason,
            state.posts_fetched,
            state.pages_fetched
        );

        Ok(HarvestOutcome {
            posts_fetched: state.posts_fetched,
            posts_seen: state.posts_seen,
            pages_fetched: state.pages_fetched,
            pinned: state.pinned,
            stop_reason,
            last_params: state.params,
        })
    }
}

fn log_abort(params: &PageParams, error: &dyn std::fmt::Display) {
    match &params.before_id {
        Some(cursor) => tracing::error!("Harvest aborted: {} (resume with before_id {})", error, cursor),
        None => tracing::error!("Harvest aborted on the first page: {}", error),
    }
}
