//! Video clips through Replicate image-to-video or text-to-video models.

use super::ReplicateClient;
use crate::artifacts::{artifact_path, batch_stamp, extension_from_url};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use std::path::{Path, PathBuf};
use storyreel_config::StoryreelConfig;
use storyreel_core::{Scene, ScenePlan};
use storyreel_error::{StorageError, StorageErrorKind, StoryreelResult};
use storyreel_interface::VideoGenerator;
use tracing::{info, instrument};

/// Frame rate requested from text-to-video models.
const TEXT_TO_VIDEO_FPS: f64 = 8.0;

/// Generates one clip per scene.
///
/// With a storyboard, each clip is animated from its scene's image. Without
/// one, clips are generated from the visual description alone.
#[derive(Debug, Clone)]
pub struct ReplicateVideoGenerator {
    client: ReplicateClient,
    image_to_video_model: String,
    text_to_video_model: String,
    dir: PathBuf,
}

impl ReplicateVideoGenerator {
    /// Create a generator writing into `dir`.
    pub fn new(
        client: ReplicateClient,
        image_to_video_model: impl Into<String>,
        text_to_video_model: impl Into<String>,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            image_to_video_model: image_to_video_model.into(),
            text_to_video_model: text_to_video_model.into(),
            dir: dir.into(),
        }
    }

    /// Create a generator from configuration; clips land in `{output}/clips`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the Replicate API token is missing.
    pub fn from_config(config: &StoryreelConfig) -> StoryreelResult<Self> {
        let replicate = &config.providers.replicate;
        Ok(Self::new(
            ReplicateClient::from_config(config)?,
            replicate.video_model.as_str(),
            replicate.text_to_video_model.as_str(),
            config.output.dir.join("clips"),
        ))
    }

    async fn clip_from_image(&self, image: &str) -> StoryreelResult<String> {
        let input = json!({ "input_image": image_input(image).await? });
        self.client.run(&self.image_to_video_model, &input).await
    }

    async fn clip_from_text(&self, scene: &Scene) -> StoryreelResult<String> {
        let input = json!({
            "prompt": scene.visual_description(),
            "num_frames": text_to_video_frames(*scene.duration()),
            "fps": TEXT_TO_VIDEO_FPS as u32,
        });
        self.client.run(&self.text_to_video_model, &input).await
    }
}

#[async_trait]
impl VideoGenerator for ReplicateVideoGenerator {
    #[instrument(skip(self, plan, storyboard), fields(scenes = plan.len(), conditioned = storyboard.is_some()))]
    async fn generate_clips(
        &self,
        plan: &ScenePlan,
        storyboard: Option<&[String]>,
    ) -> StoryreelResult<Vec<PathBuf>> {
        if let Some(images) = storyboard {
            plan.expect_per_scene("storyboard", images.len())?;
        }

        let stamp = batch_stamp();
        let mut clips = Vec::with_capacity(plan.len());

        for (index, scene) in plan.scenes().iter().enumerate() {
            let url = match storyboard {
                Some(images) => self.clip_from_image(&images[index]).await?,
                None => self.clip_from_text(scene).await?,
            };

            let prefix = format!("scene_{}", scene.scene_number());
            let path = artifact_path(&self.dir, &prefix, &stamp, extension_from_url(&url, "mp4"));
            self.client.download(&url, &path).await?;

            info!(scene = scene.scene_number(), path = %path.display(), "Clip saved");
            clips.push(path);
        }

        Ok(clips)
    }
}

/// Frames for a text-to-video clip of `duration` seconds.
fn text_to_video_frames(duration: f64) -> u32 {
    (duration * TEXT_TO_VIDEO_FPS).round().clamp(8.0, 96.0) as u32
}

/// Remote references pass through; local files are inlined as data URIs.
async fn image_input(reference: &str) -> StoryreelResult<String> {
    if reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("data:")
    {
        return Ok(reference.to_string());
    }

    let path = Path::new(reference);
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })?;

    let mime = match path.extension().and_then(|ext| ext.to_str()) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    };
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}
