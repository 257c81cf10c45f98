//! Storage traits and error types
//!
//! This module defines the trait interface for post storage backends and
//! associated error types.

use crate::api::PostId;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid artifact name: {0:?}")]
    InvalidName(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for post storage backends
///
/// One artifact per post, addressed by directory and post id, plus named
/// sidecar documents next to them. Writes must be idempotent.
pub trait PostStore: Send + Sync {
    /// Returns true if an artifact for `post_id` already exists in `dir`
    fn exists(&self, dir: &Path, post_id: &PostId) -> StoreResult<bool>;

    /// Writes a post artifact
    ///
    /// Returns `false`, leaving storage untouched, when `overwrite` is false
    /// and the artifact already exists. Otherwise creates or replaces it and
    /// returns `true`.
    fn write(&self, dir: &Path, post_id: &PostId, payload: &Value, overwrite: bool)
        -> StoreResult<bool>;

    /// Writes (always replacing) a named metadata document in `dir`
    fn write_sidecar(&self, dir: &Path, name: &str, value: &Value) -> StoreResult<()>;
}
