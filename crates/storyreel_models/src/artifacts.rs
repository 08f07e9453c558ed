//! Naming and writing of generated media files.

use std::path::{Path, PathBuf};
use storyreel_error::{StorageError, StorageErrorKind, StoryreelResult};

/// Stamp that keeps artifacts of different runs apart inside a shared
/// directory.
pub(crate) fn batch_stamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S_%3f").to_string()
}

/// `{dir}/{prefix}_{stamp}.{extension}`
pub(crate) fn artifact_path(dir: &Path, prefix: &str, stamp: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}_{}.{}", prefix, stamp, extension))
}

/// Write `bytes` to `path`, creating the parent directory if needed.
pub(crate) async fn write_artifact(path: &Path, bytes: &[u8]) -> StoryreelResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                parent.display(),
                e
            )))
        })?;
    }

    tokio::fs::write(path, bytes).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })?;
    Ok(())
}

/// Guess a file extension from a URL path, falling back to `default`.
pub(crate) fn extension_from_url<'a>(url: &'a str, default: &'a str) -> &'a str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && (1..=4).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext
        }
        _ => default,
    }
}
