//! Result handed back to the caller of a run.

use crate::{RunState, ScenePlan, ScriptOutput};
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of one run.
///
/// Only constructible through [`RunResult::succeeded`] and
/// [`RunResult::failed`], so `success` is true exactly when `video_path` is
/// set and `error` is not.
#[derive(Debug, Clone, PartialEq, Serialize, derive_getters::Getters)]
pub struct RunResult {
    /// Whether the final video was produced
    success: bool,
    /// Final video path on success
    #[serde(skip_serializing_if = "Option::is_none")]
    video_path: Option<PathBuf>,
    /// Script, if the script stage completed
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<ScriptOutput>,
    /// Scene plan, if the scene stage completed
    #[serde(skip_serializing_if = "Option::is_none")]
    scenes: Option<ScenePlan>,
    /// Everything recorded during the run
    project_data: RunState,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RunResult {
    /// Result of a run that produced `video_path`.
    pub fn succeeded(video_path: PathBuf, project_data: RunState) -> Self {
        Self {
            success: true,
            video_path: Some(video_path),
            script: project_data.script().cloned(),
            scenes: project_data.scene_plan().cloned(),
            project_data,
            error: None,
        }
    }

    /// Result of a run that stopped with `error`.
    ///
    /// An empty message is replaced so that failed results always carry
    /// a non-empty error string.
    pub fn failed(project_data: RunState, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "pipeline failed without an error message".to_string();
        }
        Self {
            success: false,
            video_path: None,
            script: project_data.script().cloned(),
            scenes: project_data.scene_plan().cloned(),
            project_data,
            error: Some(error),
        }
    }

    /// Consume the result and return the run state.
    pub fn into_project_data(self) -> RunState {
        self.project_data
    }
}
