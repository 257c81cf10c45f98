//! Storage module for persisting harvested posts
//!
//! This module handles everything written to disk by a run:
//! - One JSON artifact per post, named by post id
//! - Sidecar metadata documents (`blog_info`, `scrape_info`)
//! - Existence checks that drive duplicate detection

mod fs;
mod traits;

pub use fs::FsPostStore;
pub use traits::{PostStore, StoreError, StoreResult};
