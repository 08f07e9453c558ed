//! Filesystem-backed metadata store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use storyreel_core::{RunId, RunState};
use storyreel_error::{StorageError, StorageErrorKind, StoryreelResult};
use storyreel_interface::MetadataStore;

/// Writes one JSON record per run into a single directory.
///
/// The directory is expected to exist already (see
/// [`ensure_directories`](crate::ensure_directories)); a missing directory is
/// reported as an error rather than created on the fly.
#[derive(Debug, Clone)]
pub struct FileSystemMetadataStore {
    dir: PathBuf,
}

impl FileSystemMetadataStore {
    /// Create a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory records are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `run_id`.
    pub fn record_path(&self, run_id: &RunId) -> PathBuf {
        self.dir.join(format!("project_{}.json", run_id))
    }
}

#[async_trait]
impl MetadataStore for FileSystemMetadataStore {
    #[tracing::instrument(skip(self, state), fields(run_id = %state.run_id(), stages = state.stages().len()))]
    async fn persist(&self, state: &RunState) -> StoryreelResult<PathBuf> {
        if !tokio::fs::try_exists(&self.dir).await.unwrap_or(false) {
            return Err(StorageError::new(StorageErrorKind::MissingDirectory(
                self.dir.display().to_string(),
            ))
            .into());
        }

        let json = serde_json::to_string_pretty(state).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(e.to_string()))
        })?;

        let path = self.record_path(state.run_id());

        // Write to temp file first, then rename so readers never see a partial record
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json.as_bytes())
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    temp_path.display(),
                    e
                )))
            })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(path = %path.display(), "Saved project metadata");
        Ok(path)
    }

    #[tracing::instrument(skip(self), fields(run_id = %run_id))]
    async fn load(&self, run_id: &RunId) -> StoryreelResult<RunState> {
        let path = self.record_path(run_id);

        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(path.display().to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        let state = serde_json::from_str(&contents).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;

        tracing::debug!(path = %path.display(), "Loaded project metadata");
        Ok(state)
    }
}
