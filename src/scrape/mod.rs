//! Scrape module: one complete run against one blog
//!
//! Composes the metadata lookup and the harvester, and owns the on-disk
//! layout of a blog directory and its run summary.

mod info;
mod scraper;

pub use info::ScrapeInfo;
pub use scraper::{Scraper, BLOG_INFO_SIDECAR, POSTS_DIR, SCRAPE_INFO_SIDECAR};
