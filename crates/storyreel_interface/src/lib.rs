//! Trait definitions for the Storyreel pipeline.
//!
//! Every stage of the pipeline is a collaborator behind one of the traits in
//! [`stages`]. The orchestrator only sequences these calls; it never knows
//! which provider sits behind them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod metadata;
mod progress;
mod stages;

pub use driver::{CompletionRequest, CompletionRequestBuilder, TextDriver};
pub use metadata::MetadataStore;
pub use progress::ProgressReporter;
pub use stages::{
    AudioGenerator, SceneEnhancer, ScenePlanner, ScriptGenerator, StoryboardGenerator,
    VideoAssembler, VideoGenerator,
};
