//! Scrape orchestration: metadata, sidecars, then the harvest itself

use crate::api::BlogApi;
use crate::harvest::{HarvestOptions, Harvester};
use crate::metadata::{fetch_blog_metadata, BlogRef};
use crate::scrape::ScrapeInfo;
use crate::store::{PostStore, StoreError};
use crate::Result;
use chrono::Utc;
use serde::Serialize;
use std::path::Path;

/// Sub-directory of a blog directory that holds the post artifacts
pub const POSTS_DIR: &str = "_json";

/// Sidecar with the raw blog info response
pub const BLOG_INFO_SIDECAR: &str = "blog_info";

/// Sidecar with the run summary
pub const SCRAPE_INFO_SIDECAR: &str = "scrape_info";

/// Runs a complete scrape of one blog into one directory
pub struct Scraper<A, S> {
    harvester: Harvester<A, S>,
}

impl<A: BlogApi, S: PostStore> Scraper<A, S> {
    pub fn new(harvester: Harvester<A, S>) -> Self {
        Self { harvester }
    }

    pub fn harvester(&self) -> &Harvester<A, S> {
        &self.harvester
    }

    /// Scrapes `blog_id` into `dir`
    ///
    /// Layout:
    /// - `dir/blog_info.json` - blog metadata as returned by the API
    /// - `dir/scrape_info.json` - run summary ([`ScrapeInfo`])
    /// - `dir/_json/<post id>.json` - one file per post
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use tumblr_harvest::config::{ApiConfig, Credentials};
    /// use tumblr_harvest::{FsPostStore, HarvestDefaults, HarvestOptions, Harvester, Scraper, TumblrClient};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = TumblrClient::new(&ApiConfig::default(), Credentials::from_env()?)?;
    /// let harvester = Harvester::new(client, FsPostStore::new(), HarvestDefaults::default());
    /// let info = Scraper::new(harvester)
    ///     .scrape("staff", Path::new("/tmp/staff"), &HarvestOptions::new())
    ///     .await?;
    /// println!("{} new posts", info.posts_fetched.unwrap_or(0));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scrape(
        &self,
        blog_id: &str,
        dir: &Path,
        options: &HarvestOptions,
    ) -> Result<ScrapeInfo> {
        let scrape_start = Utc::now();

        // Reject bad options before touching the network
        self.harvester.defaults().resolve(options)?;

        let info = fetch_blog_metadata(self.harvester.api(), blog_id).await?;
        tracing::info!(
            "Preparing to scrape {} ({}) into {}",
            info.name,
            info.uuid,
            dir.display()
        );

        let store = self.harvester.store();
        store.write_sidecar(dir, BLOG_INFO_SIDECAR, &info.raw)?;

        let mut scrape_info = ScrapeInfo::started(BlogRef::from(&info), scrape_start);
        write_json(store, dir, SCRAPE_INFO_SIDECAR, &scrape_info)?;

        let outcome = self
            .harvester
            .harvest(&info.uuid, &dir.join(POSTS_DIR), options)
            .await?;

        scrape_info.finish(outcome, info.total_posts, Utc::now());
        write_json(store, dir, SCRAPE_INFO_SIDECAR, &scrape_info)?;

        Ok(scrape_info)
    }
}

fn write_json<S, T>(store: &S, dir: &Path, name: &str, value: &T) -> Result<()>
where
    S: PostStore,
    T: Serialize,
{
    let value = serde_json::to_value(value).map_err(StoreError::from)?;
    store.write_sidecar(dir, name, &value)?;
    Ok(())
}
