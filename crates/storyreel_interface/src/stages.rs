//! Stage transform traits.
//!
//! Each trait is one request/response boundary. Implementations own their
//! timeout and retry policy; the orchestrator awaits each call to completion.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use storyreel_core::{ScenePlan, ScriptOutput};
use storyreel_error::StoryreelResult;

/// Turns a user prompt into a titled narration script.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Generate a script for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns a content error when the upstream response is not a valid
    /// `{title, script}` structure, or a provider error on service failure.
    async fn generate(&self, prompt: &str) -> StoryreelResult<ScriptOutput>;
}

/// Splits a script into timed scenes.
#[async_trait]
pub trait ScenePlanner: Send + Sync {
    /// Plan scenes for `script`.
    ///
    /// `target_scenes` and `scene_duration` override the planner's defaults.
    async fn create_plan(
        &self,
        script: &ScriptOutput,
        target_scenes: Option<u32>,
        scene_duration: Option<f64>,
    ) -> StoryreelResult<ScenePlan>;
}

/// Rewrites scene visual descriptions into richer generation prompts.
#[async_trait]
pub trait SceneEnhancer: Send + Sync {
    /// Enhance `plan`; `context` is the video title or original prompt.
    async fn enhance(&self, plan: ScenePlan, context: &str) -> StoryreelResult<ScenePlan>;
}

/// Produces one storyboard image reference per scene.
#[async_trait]
pub trait StoryboardGenerator: Send + Sync {
    /// Generate storyboard images for `plan`, in scene order.
    async fn generate(&self, plan: &ScenePlan) -> StoryreelResult<Vec<String>>;
}

/// Produces one video clip per scene.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Generate clips for `plan`, in scene order.
    ///
    /// When `storyboard` is `None` implementations fall back to
    /// text-conditioned generation from the visual descriptions.
    async fn generate_clips(
        &self,
        plan: &ScenePlan,
        storyboard: Option<&[String]>,
    ) -> StoryreelResult<Vec<PathBuf>>;
}

/// Synthesizes the narration track for a whole script.
#[async_trait]
pub trait AudioGenerator: Send + Sync {
    /// Generate narration audio for `script`.
    async fn generate(&self, script: &ScriptOutput) -> StoryreelResult<PathBuf>;
}

/// Combines clips and narration into the final video.
#[async_trait]
pub trait VideoAssembler: Send + Sync {
    /// Assemble `clips` with `audio` into `output`; returns the written path.
    async fn assemble(
        &self,
        clips: &[PathBuf],
        audio: &Path,
        output: &Path,
    ) -> StoryreelResult<PathBuf>;
}
