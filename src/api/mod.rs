//! Blog API module
//!
//! This module contains everything that talks to the remote blog service:
//! - Wire types for posts, pages, and blog metadata
//! - The [`BlogApi`] trait the harvester is written against
//! - A reqwest-backed implementation with OAuth signing and retries

mod client;
mod oauth;
mod types;

pub use client::{full_blog_id, RetryPolicy, TumblrClient};
pub use oauth::{signature_base_string, OAuthSigner};
pub use types::{BlogInfo, Page, PageParams, Post, PostId};

use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of blog metadata and post pages
///
/// Retries, signing, and transport details live behind this trait; from the
/// caller's side each call either succeeds or fails for good.
#[async_trait]
pub trait BlogApi: Send + Sync {
    /// Fetches descriptive metadata for a blog
    async fn get_blog_info(&self, blog_id: &str) -> Result<BlogInfo>;

    /// Fetches one page of posts, older than `params.before_id` if set
    async fn get_page(&self, blog_id: &str, params: &PageParams) -> Result<Page>;
}

#[async_trait]
impl<T: BlogApi + ?Sized> BlogApi for Arc<T> {
    async fn get_blog_info(&self, blog_id: &str) -> Result<BlogInfo> {
        (**self).get_blog_info(blog_id).await
    }

    async fn get_page(&self, blog_id: &str, params: &PageParams) -> Result<Page> {
        (**self).get_page(blog_id, params).await
    }
}
