//! One-time output directory setup.

use std::path::Path;
use storyreel_error::{StorageError, StorageErrorKind, StoryreelResult};

/// Create every directory in `paths`, including missing parents.
///
/// Called once per process before the first run. Existing directories are
/// left untouched.
///
/// # Errors
///
/// Returns [`StorageErrorKind::DirectoryCreation`] for the first directory
/// that cannot be created.
#[tracing::instrument(skip_all, fields(count = paths.len()))]
pub fn ensure_directories<P: AsRef<Path>>(paths: &[P]) -> StoryreelResult<()> {
    for path in paths {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        tracing::debug!(path = %path.display(), "Ensured directory");
    }
    Ok(())
}
