//! Progress notifications emitted around each stage.

use crate::StageName;
use serde::{Deserialize, Serialize};

/// Number of pipeline steps reported in every notification.
pub const TOTAL_STEPS: u8 = 6;

/// Where a stage is in its lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// The stage is about to run
    #[display("starting")]
    Starting,
    /// The stage finished and its output was recorded
    #[display("completed")]
    Completed,
    /// The stage was skipped by configuration
    #[display("skipped")]
    Skipped,
}

/// One progress notification: `(step, total_steps, label, detail)` plus the
/// lifecycle status.
///
/// # Examples
///
/// ```
/// use storyreel_core::{ProgressEvent, ProgressStatus, StageName};
///
/// let event = ProgressEvent::completed(StageName::Scenes, "5 scenes created");
/// assert_eq!(*event.step(), 2);
/// assert_eq!(*event.total_steps(), 6);
/// assert_eq!(*event.status(), ProgressStatus::Completed);
/// assert_eq!(event.label(), "Scenes planned");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ProgressEvent {
    /// One-based step index
    step: u8,
    /// Total number of steps
    total_steps: u8,
    /// Lifecycle status
    status: ProgressStatus,
    /// Short status label
    label: String,
    /// Human-readable detail
    detail: String,
}

impl ProgressEvent {
    /// Notification emitted before `stage` runs.
    pub fn starting(stage: StageName, detail: impl Into<String>) -> Self {
        Self::new(stage, ProgressStatus::Starting, stage.starting_label(), detail)
    }

    /// Notification emitted after `stage` succeeded.
    pub fn completed(stage: StageName, detail: impl Into<String>) -> Self {
        Self::new(stage, ProgressStatus::Completed, stage.completed_label(), detail)
    }

    /// Notification emitted in place of `stage` when it is disabled.
    pub fn skipped(stage: StageName, detail: impl Into<String>) -> Self {
        let label = format!("{} skipped", stage.title());
        Self::new(stage, ProgressStatus::Skipped, label, detail)
    }

    fn new(
        stage: StageName,
        status: ProgressStatus,
        label: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            step: stage.step(),
            total_steps: TOTAL_STEPS,
            status,
            label: label.into(),
            detail: detail.into(),
        }
    }
}
