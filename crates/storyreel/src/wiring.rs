//! Assembling a pipeline from configuration.

use std::sync::Arc;
use storyreel_config::{StoryreelConfig, TtsProvider, VideoProvider};
use storyreel_error::StoryreelResult;
use storyreel_interface::{AudioGenerator, VideoGenerator};
use storyreel_models::{
    ElevenLabsSpeechGenerator, OpenAiChatDriver, OpenAiSpeechGenerator,
    ReplicateStoryboardGenerator, ReplicateVideoGenerator,
};
use storyreel_pipeline::{
    CinematicEnhancer, FfmpegAssembler, LlmScenePlanner, LlmScriptGenerator, Pipeline,
};
use storyreel_storage::FileSystemMetadataStore;
use tracing::{info, instrument};

/// Build a [`Pipeline`] with the providers selected in `config`.
///
/// Every adapter is constructed up front, so a missing credential fails here
/// with a configuration error before any run begins. Only the providers the
/// configuration actually uses need credentials: the ElevenLabs key is not
/// required when narration goes through OpenAI, and the storyboard model is
/// not wired when storyboards are disabled.
///
/// # Errors
///
/// Returns a configuration error when a required credential is missing or
/// a setting is out of range.
#[instrument(skip_all, fields(output = %config.output.dir.display()))]
pub fn build_pipeline(config: &StoryreelConfig) -> StoryreelResult<Pipeline> {
    config.validate()?;

    let openai = &config.providers.openai;
    let driver = OpenAiChatDriver::from_config(config)?;
    let script_generator =
        LlmScriptGenerator::new(driver.clone()).with_max_tokens(openai.script_max_tokens);
    let scene_planner = LlmScenePlanner::new(driver).with_max_tokens(openai.scene_max_tokens);

    let video_generator: Arc<dyn VideoGenerator> = match config.video.provider {
        VideoProvider::Replicate => Arc::new(ReplicateVideoGenerator::from_config(config)?),
    };

    let audio_generator: Arc<dyn AudioGenerator> = match config.audio.provider {
        TtsProvider::ElevenLabs => Arc::new(ElevenLabsSpeechGenerator::from_config(config)?),
        TtsProvider::OpenAi => Arc::new(OpenAiSpeechGenerator::from_config(config)?),
    };

    let mut builder = Pipeline::builder()
        .script_generator(Arc::new(script_generator))
        .scene_planner(Arc::new(scene_planner))
        .video_generator(video_generator)
        .audio_generator(audio_generator)
        .assembler(Arc::new(FfmpegAssembler::new(&config.assembly.ffmpeg_path)))
        .metadata_store(Arc::new(FileSystemMetadataStore::new(&config.output.dir)))
        .output_dir(&config.output.dir)
        .use_storyboard(config.pipeline.use_storyboard)
        .default_scene_count(config.pipeline.default_scene_count)
        .default_scene_duration(config.pipeline.default_scene_duration);

    if config.pipeline.use_storyboard {
        builder =
            builder.storyboard_generator(Arc::new(ReplicateStoryboardGenerator::from_config(config)?));
    }
    if config.pipeline.use_cinematic_enhancement {
        builder = builder.scene_enhancer(Arc::new(CinematicEnhancer::new()));
    }

    let pipeline = builder.build()?;
    info!(
        model = %openai.model,
        tts = ?config.audio.provider,
        storyboard = config.pipeline.use_storyboard,
        cinematic = config.pipeline.use_cinematic_enhancement,
        "Pipeline ready"
    );
    Ok(pipeline)
}
