//! Blog metadata lookup
//!
//! Resolves a blog identifier as typed by a user (short name, custom
//! domain, or UUID) to the blog's canonical UUID, name, and post count.

use crate::api::{BlogApi, BlogInfo};
use crate::Result;
use serde::Serialize;

/// Name and canonical id of a blog, as recorded in `scrape_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogRef {
    pub name: String,
    pub uuid: String,
}

impl From<&BlogInfo> for BlogRef {
    fn from(info: &BlogInfo) -> Self {
        Self {
            name: info.name.clone(),
            uuid: info.uuid.clone(),
        }
    }
}

/// Fetches metadata for `blog_id` with a single API call
///
/// Upstream and transport errors propagate unchanged; there is no retry at
/// this level.
pub async fn fetch_blog_metadata<A>(api: &A, blog_id: &str) -> Result<BlogInfo>
where
    A: BlogApi + ?Sized,
{
    let info = api.get_blog_info(blog_id).await?;
    tracing::info!(
        "Resolved {} to {} ({}), {} posts",
        blog_id,
        info.uuid,
        info.name,
        info.total_posts
    );
    Ok(info)
}
