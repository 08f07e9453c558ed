//! Storyboard images through a Replicate text-to-image model.

use super::ReplicateClient;
use crate::artifacts::{artifact_path, batch_stamp, extension_from_url};
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use storyreel_config::StoryreelConfig;
use storyreel_core::ScenePlan;
use storyreel_error::StoryreelResult;
use storyreel_interface::StoryboardGenerator;
use tracing::{info, instrument};

/// Generates one 16:9 still per scene and keeps a local copy.
///
/// Returned references are local file paths, since prediction output URLs
/// expire.
#[derive(Debug, Clone)]
pub struct ReplicateStoryboardGenerator {
    client: ReplicateClient,
    model: String,
    dir: PathBuf,
}

impl ReplicateStoryboardGenerator {
    /// Create a generator writing into `dir`.
    pub fn new(client: ReplicateClient, model: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            model: model.into(),
            dir: dir.into(),
        }
    }

    /// Create a generator from configuration; images land in `{output}/storyboards`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the Replicate API token is missing.
    pub fn from_config(config: &StoryreelConfig) -> StoryreelResult<Self> {
        Ok(Self::new(
            ReplicateClient::from_config(config)?,
            config.providers.replicate.storyboard_model.as_str(),
            config.output.dir.join("storyboards"),
        ))
    }
}

#[async_trait]
impl StoryboardGenerator for ReplicateStoryboardGenerator {
    #[instrument(skip(self, plan), fields(model = %self.model, scenes = plan.len()))]
    async fn generate(&self, plan: &ScenePlan) -> StoryreelResult<Vec<String>> {
        let stamp = batch_stamp();
        let mut images = Vec::with_capacity(plan.len());

        for scene in plan.scenes() {
            let input = json!({
                "prompt": scene.visual_description(),
                "width": 1024,
                "height": 576,
            });
            let url = self.client.run(&self.model, &input).await?;

            let prefix = format!("scene_{}", scene.scene_number());
            let path = artifact_path(&self.dir, &prefix, &stamp, extension_from_url(&url, "png"));
            self.client.download(&url, &path).await?;

            info!(scene = scene.scene_number(), path = %path.display(), "Storyboard image saved");
            images.push(path.display().to_string());
        }

        Ok(images)
    }
}
