//! File-per-post storage on the local filesystem
//!
//! Posts land in `<dir>/<id>.json` as compact JSON; sidecars land in
//! `<dir>/<name>.json` pretty-printed. Every file is written to a hidden
//! temporary sibling first and renamed into place.

use crate::api::PostId;
use crate::store::{PostStore, StoreError, StoreResult};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem-backed [`PostStore`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPostStore;

impl FsPostStore {
    pub fn new() -> Self {
        Self
    }

    /// Path of the artifact for `post_id` inside `dir`
    pub fn post_path(dir: &Path, post_id: &PostId) -> StoreResult<PathBuf> {
        let name = checked_name(post_id.as_str())?;
        Ok(dir.join(format!("{name}.json")))
    }
}

impl PostStore for FsPostStore {
    fn exists(&self, dir: &Path, post_id: &PostId) -> StoreResult<bool> {
        Ok(Self::post_path(dir, post_id)?.exists())
    }

    fn write(
        &self,
        dir: &Path,
        post_id: &PostId,
        payload: &Value,
        overwrite: bool,
    ) -> StoreResult<bool> {
        let path = Self::post_path(dir, post_id)?;
        if !overwrite && path.exists() {
            tracing::warn!("File already exists: {}", path.display());
            return Ok(false);
        }

        let bytes = serde_json::to_vec(payload)?;
        write_atomic(&path, &bytes)?;
        Ok(true)
    }

    fn write_sidecar(&self, dir: &Path, name: &str, value: &Value) -> StoreResult<()> {
        let name = checked_name(name)?;
        let path = dir.join(format!("{name}.json"));
        let bytes = serde_json::to_vec_pretty(value)?;
        write_atomic(&path, &bytes)
    }
}

/// Rejects names that would escape the target directory
fn checked_name(name: &str) -> StoreResult<&str> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(name)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(io_err)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(".{file_name}.tmp"));

    fs::write(&tmp, bytes).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}
