//! Filesystem helpers for staging.
//!
//! All helpers are idempotent so a rerun over a partially assembled output
//! directory succeeds.

use super::error::{ErrorExt, Result};
use crate::bail;
use std::{io, path::Path};
use tokio::fs;

/// Creates all directories of `path`; an existing directory is not an error.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Whether two existing paths refer to the same file.
async fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copies a regular file, creating the destination's parent directories.
///
/// Copying a file onto itself succeeds without touching it. Returns the number
/// of bytes in the destination.
pub async fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    if !from.exists() {
        bail!("{} does not exist", from.display());
    }
    if !from.is_file() {
        bail!("{} is not a file", from.display());
    }
    if same_file(from, to).await {
        log::debug!("{} is already in place", to.display());
        let metadata = fs::metadata(to).await.fs_context("reading metadata", to)?;
        return Ok(metadata.len());
    }
    if let Some(dest_dir) = to.parent() {
        create_dir_all(dest_dir).await?;
    }
    fs::copy(from, to).await.fs_context("copying file to", to)
}
