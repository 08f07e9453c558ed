//! Deterministic cinematic vocabulary for scene visuals.

use async_trait::async_trait;
use storyreel_core::{Scene, ScenePlan};
use storyreel_error::StoryreelResult;
use storyreel_interface::SceneEnhancer;
use tracing::debug;

const LIGHTING: [&str; 4] = [
    "golden hour lighting",
    "soft diffused light",
    "dramatic rim lighting",
    "natural volumetric light",
];

const DEPTH: &str = "shallow depth of field";
const QUALITY: &str = "cinematic, highly detailed, 4k";

/// Context keywords mapped to the subject hint they add.
const SUBJECT_HINTS: [(&[&str], &str); 5] = [
    (&["ocean", "sea", "wave", "tide", "beach"], "sweeping seascape"),
    (&["space", "planet", "star", "galaxy", "orbit"], "vast cosmic backdrop"),
    (&["forest", "tree", "jungle", "leaf"], "lush natural textures"),
    (&["city", "street", "urban", "building"], "bustling urban atmosphere"),
    (&["history", "ancient", "empire", "medieval"], "period-accurate detail"),
];

/// Adds camera framing, lighting, depth and quality keywords to each scene.
///
/// Framing follows the scene's position: the first scene opens wide, the last
/// closes on a pull-back, and the scenes between alternate medium and
/// close-up shots. Lighting cycles through a fixed palette. Scene numbers,
/// narration and durations are never touched, and a description that
/// already carries the quality keywords is left alone so enhancing twice is
/// a no-op.
///
/// # Examples
///
/// ```
/// use storyreel_core::{SceneBuilder, ScenePlan};
/// use storyreel_pipeline::CinematicEnhancer;
///
/// let plan = ScenePlan::new(vec![SceneBuilder::default()
///     .scene_number(1u32)
///     .narration("Waves roll in")
///     .visual_description("Waves on a beach")
///     .duration(6.0)
///     .build()
///     .unwrap()]);
/// let enhanced = CinematicEnhancer::new().enhance_plan(plan, "the ocean at dawn");
/// let visual = enhanced.scenes()[0].visual_description();
/// assert!(visual.starts_with("Wide establishing shot"));
/// assert!(visual.contains("sweeping seascape"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CinematicEnhancer;

impl CinematicEnhancer {
    /// Create an enhancer.
    pub fn new() -> Self {
        Self
    }

    /// Enhance every scene of `plan`, using `context` to pick a subject hint.
    pub fn enhance_plan(&self, plan: ScenePlan, context: &str) -> ScenePlan {
        let total = plan.len();
        let hint = subject_hint(context);
        let scenes = plan
            .into_scenes()
            .into_iter()
            .enumerate()
            .map(|(index, scene)| enhance_scene(scene, index, total, hint))
            .collect();
        ScenePlan::new(scenes)
    }
}

fn framing(index: usize, total: usize) -> &'static str {
    if index == 0 {
        "Wide establishing shot"
    } else if index + 1 == total {
        "Slow pull-back wide shot"
    } else if index % 2 == 1 {
        "Medium tracking shot"
    } else {
        "Intimate close-up"
    }
}

fn subject_hint(context: &str) -> Option<&'static str> {
    let context = context.to_lowercase();
    SUBJECT_HINTS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| context.contains(k)))
        .map(|(_, hint)| *hint)
}

fn enhance_scene(scene: Scene, index: usize, total: usize, hint: Option<&str>) -> Scene {
    let base = scene.visual_description().trim().trim_end_matches('.').to_string();
    if base.contains(QUALITY) {
        debug!(scene = scene.scene_number(), "Scene already enhanced");
        return scene;
    }

    let mut parts = vec![
        format!("{}: {}", framing(index, total), base),
        LIGHTING[index % LIGHTING.len()].to_string(),
        DEPTH.to_string(),
    ];
    if let Some(hint) = hint {
        parts.push(hint.to_string());
    }
    parts.push(QUALITY.to_string());

    scene.with_visual_description(parts.join(", "))
}

#[async_trait]
impl SceneEnhancer for CinematicEnhancer {
    async fn enhance(&self, plan: ScenePlan, context: &str) -> StoryreelResult<ScenePlan> {
        Ok(self.enhance_plan(plan, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_core::SceneBuilder;

    fn plan(count: u32) -> ScenePlan {
        ScenePlan::new(
            (1..=count)
                .map(|n| {
                    SceneBuilder::default()
                        .scene_number(n)
                        .narration(format!("Narration {n}"))
                        .visual_description(format!("Visual {n}."))
                        .duration(5.0)
                        .build()
                        .unwrap()
                })
                .collect(),
        )
    }

    #[test]
    fn test_framing_follows_position() {
        let enhanced = CinematicEnhancer::new().enhance_plan(plan(4), "rainbows");
        let visuals: Vec<&String> = enhanced
            .scenes()
            .iter()
            .map(|s| s.visual_description())
            .collect();
        assert!(visuals[0].starts_with("Wide establishing shot: Visual 1,"));
        assert!(visuals[1].starts_with("Medium tracking shot: Visual 2,"));
        assert!(visuals[2].starts_with("Intimate close-up: Visual 3,"));
        assert!(visuals[3].starts_with("Slow pull-back wide shot: Visual 4,"));
        assert!(visuals[2].contains("dramatic rim lighting"));
    }

    #[test]
    fn test_numbering_and_narration_preserved() {
        let original = plan(3);
        let enhanced = CinematicEnhancer::new().enhance_plan(original.clone(), "");
        assert!(enhanced.validate().is_ok());
        for (before, after) in original.scenes().iter().zip(enhanced.scenes()) {
            assert_eq!(before.scene_number(), after.scene_number());
            assert_eq!(before.narration(), after.narration());
            assert_eq!(before.duration(), after.duration());
            assert_ne!(before.visual_description(), after.visual_description());
        }
    }

    #[test]
    fn test_enhancing_twice_is_stable() {
        let enhancer = CinematicEnhancer::new();
        let once = enhancer.enhance_plan(plan(2), "deep space");
        let twice = enhancer.enhance_plan(once.clone(), "deep space");
        assert_eq!(once, twice);
        assert!(once.scenes()[0].visual_description().contains("vast cosmic backdrop"));
    }

    #[test]
    fn test_no_hint_without_matching_context() {
        let enhanced = CinematicEnhancer::new().enhance_plan(plan(1), "a quiet kitchen");
        let visual = enhanced.scenes()[0].visual_description();
        assert!(visual.ends_with(QUALITY));
        assert!(SUBJECT_HINTS.iter().all(|(_, hint)| !visual.contains(hint)));
    }
}
