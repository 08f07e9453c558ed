//! Durable storage for run records.

use async_trait::async_trait;
use std::path::PathBuf;
use storyreel_core::{RunId, RunState};
use storyreel_error::StoryreelResult;

/// Persists the run state at the end of each run attempt.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Write `state` and return where it was stored.
    async fn persist(&self, state: &RunState) -> StoryreelResult<PathBuf>;

    /// Read back the record of a previous run.
    async fn load(&self, run_id: &RunId) -> StoryreelResult<RunState>;
}
