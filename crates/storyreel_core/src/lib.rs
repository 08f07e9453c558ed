//! Core data types for the Storyreel pipeline.
//!
//! This crate holds the data model shared by the orchestrator, the stage
//! transforms and the metadata persister: stage outputs, the accumulating
//! [`RunState`], the caller-facing [`RunResult`] and progress notifications.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod progress;
mod result;
mod run_id;
mod scene;
mod script;
mod stage;
mod state;

pub use progress::{ProgressEvent, ProgressStatus, TOTAL_STEPS};
pub use result::RunResult;
pub use run_id::{Clock, FixedClock, RunId, RunIdGenerator, SystemClock};
pub use scene::{Scene, SceneBuilder, ScenePlan};
pub use script::ScriptOutput;
pub use stage::{StageName, StageOutput};
pub use state::{RunState, Stages};
