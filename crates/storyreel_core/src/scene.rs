//! Scene plan produced by the second stage.

use serde::{Deserialize, Serialize};
use storyreel_error::{ContentError, ContentErrorKind, StoryreelResult};

/// One scene of a video.
///
/// # Examples
///
/// ```
/// use storyreel_core::SceneBuilder;
///
/// let scene = SceneBuilder::default()
///     .scene_number(1u32)
///     .narration("Sunlight enters a raindrop")
///     .visual_description("Macro shot of a raindrop catching light")
///     .duration(6.0)
///     .build()
///     .unwrap();
/// assert_eq!(*scene.scene_number(), 1);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(setter(into))]
pub struct Scene {
    /// Position of the scene in the plan, starting at 1
    scene_number: u32,
    /// Narration spoken over the scene
    narration: String,
    /// Visual description used for image and clip generation
    visual_description: String,
    /// Scene length in seconds
    duration: f64,
}

/// Ordered scenes for a video.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_getters::Getters)]
pub struct ScenePlan {
    /// Scenes in playback order
    scenes: Vec<Scene>,
}

impl ScenePlan {
    /// Create a plan from scenes in playback order.
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { scenes }
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether the plan has no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Sum of all scene durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.scenes.iter().map(|s| s.duration).sum()
    }

    /// Consume the plan and return its scenes.
    pub fn into_scenes(self) -> Vec<Scene> {
        self.scenes
    }

    /// Check the structural invariants of the plan.
    ///
    /// The plan must contain at least one scene, `scene_number` values must
    /// be exactly `1..=N` in list order, and every duration must be a
    /// positive finite number of seconds.
    ///
    /// # Errors
    ///
    /// Returns a content error describing the first violation found.
    pub fn validate(&self) -> StoryreelResult<()> {
        if self.scenes.is_empty() {
            return Err(invalid("plan contains no scenes"));
        }

        for (index, scene) in self.scenes.iter().enumerate() {
            let expected = index as u32 + 1;
            if scene.scene_number != expected {
                return Err(invalid(format!(
                    "scene at position {} has scene_number {} (expected {})",
                    expected, scene.scene_number, expected
                )));
            }
            if !scene.duration.is_finite() || scene.duration <= 0.0 {
                return Err(invalid(format!(
                    "scene {} has non-positive duration {}",
                    scene.scene_number, scene.duration
                )));
            }
        }

        Ok(())
    }

    /// Check that a per-scene output has one item per scene.
    ///
    /// # Errors
    ///
    /// Returns a content error when the counts differ.
    pub fn expect_per_scene(&self, stage: &str, actual: usize) -> StoryreelResult<()> {
        if actual != self.scenes.len() {
            return Err(ContentError::new(ContentErrorKind::LengthMismatch {
                stage: stage.to_string(),
                expected: self.scenes.len(),
                actual,
            })
            .into());
        }
        Ok(())
    }
}

#[track_caller]
fn invalid(message: impl Into<String>) -> storyreel_error::StoryreelError {
    ContentError::new(ContentErrorKind::InvalidScenePlan(message.into())).into()
}
