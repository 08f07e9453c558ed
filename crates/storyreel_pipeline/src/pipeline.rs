//! The run orchestrator.

use crate::filename::{derive_output_filename, resolve_output_path};
use crate::options::RunOptions;
use crate::reporter::{NoopReporter, notify};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storyreel_core::{
    Clock, ProgressEvent, RunIdGenerator, RunResult, RunState, StageName, StageOutput,
    SystemClock,
};
use storyreel_error::{ConfigError, ContentError, ContentErrorKind, StoryreelResult};
use storyreel_interface::{
    AudioGenerator, MetadataStore, ProgressReporter, SceneEnhancer, ScenePlanner,
    ScriptGenerator, StoryboardGenerator, VideoAssembler, VideoGenerator,
};
use tracing::{Instrument, debug, error, info, info_span, warn};

const DEFAULT_SCENE_COUNT: u32 = 5;
const DEFAULT_SCENE_DURATION: f64 = 6.0;

/// Sequences the six stages of a video run.
///
/// A pipeline owns its stage transforms for its whole lifetime and is
/// treated as single-run-at-a-time. Every stage is awaited to completion
/// before the next one starts; the pipeline adds no retries or timeouts of
/// its own.
pub struct Pipeline {
    script_generator: Arc<dyn ScriptGenerator>,
    scene_planner: Arc<dyn ScenePlanner>,
    scene_enhancer: Option<Arc<dyn SceneEnhancer>>,
    storyboard_generator: Option<Arc<dyn StoryboardGenerator>>,
    video_generator: Arc<dyn VideoGenerator>,
    audio_generator: Arc<dyn AudioGenerator>,
    assembler: Arc<dyn VideoAssembler>,
    metadata_store: Arc<dyn MetadataStore>,
    output_dir: PathBuf,
    use_storyboard: bool,
    default_scene_count: u32,
    default_scene_duration: f64,
    run_ids: RunIdGenerator,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("output_dir", &self.output_dir)
            .field("use_storyboard", &self.use_storyboard)
            .field("scene_enhancer", &self.scene_enhancer.is_some())
            .field("default_scene_count", &self.default_scene_count)
            .field("default_scene_duration", &self.default_scene_duration)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Start building a pipeline.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Directory final videos are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether the storyboard stage runs.
    pub fn use_storyboard(&self) -> bool {
        self.use_storyboard
    }

    /// Run every stage for `prompt`.
    ///
    /// Never returns an error: a stage failure stops the run and comes back
    /// as a failed [`RunResult`] carrying everything recorded so far. The run
    /// record is persisted whether or not the run succeeded; a persistence
    /// failure is logged and does not change the outcome.
    pub async fn run(&self, prompt: &str, options: RunOptions) -> RunResult {
        let run_id = self.run_ids.next_id();
        let span = info_span!("pipeline_run", run_id = %run_id);

        async move {
            let reporter: Arc<dyn ProgressReporter> = options
                .reporter()
                .clone()
                .unwrap_or_else(|| Arc::new(NoopReporter));
            let mut state = RunState::new(prompt, run_id);

            let outcome = self
                .execute(prompt, &options, reporter.as_ref(), &mut state)
                .await;

            match self.metadata_store.persist(&state).await {
                Ok(path) => debug!(path = %path.display(), "Run record saved"),
                Err(e) => warn!(error = %e, "Failed to persist run record"),
            }

            match outcome {
                Ok(video_path) => {
                    info!(
                        title = state.script().map(|s| s.title().as_str()).unwrap_or_default(),
                        scenes = state.scene_plan().map(|p| p.len()).unwrap_or_default(),
                        output = %video_path.display(),
                        "Video generation complete"
                    );
                    RunResult::succeeded(video_path, state)
                }
                Err(e) => {
                    error!(error = %e, stages = state.stages().len(), "Video generation failed");
                    RunResult::failed(state, e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        prompt: &str,
        options: &RunOptions,
        reporter: &dyn ProgressReporter,
        state: &mut RunState,
    ) -> StoryreelResult<PathBuf> {
        if prompt.trim().is_empty() {
            return Err(ContentError::new(ContentErrorKind::EmptyPrompt).into());
        }
        if let Some(count) = options.scene_count() {
            if *count == 0 {
                return Err(invalid_option("scene_count", "must be at least 1"));
            }
        }
        if let Some(duration) = options.scene_duration() {
            if !duration.is_finite() || *duration <= 0.0 {
                return Err(invalid_option(
                    "scene_duration",
                    format!("must be a positive number of seconds, got {duration}"),
                ));
            }
        }

        // Step 1
        notify(
            reporter,
            ProgressEvent::starting(StageName::Script, "Creating narrative structure"),
        );
        let script = self.script_generator.generate(prompt).await?;
        script.validate()?;
        let title = script.title().clone();
        state.record(StageOutput::Script(script.clone()))?;
        notify(
            reporter,
            ProgressEvent::completed(StageName::Script, format!("Title: {title}")),
        );

        // Step 2
        let scene_count = options.scene_count().unwrap_or(self.default_scene_count);
        let scene_duration = options
            .scene_duration()
            .unwrap_or(self.default_scene_duration);
        notify(
            reporter,
            ProgressEvent::starting(StageName::Scenes, format!("Creating {scene_count} scenes")),
        );
        let mut plan = self
            .scene_planner
            .create_plan(&script, Some(scene_count), Some(scene_duration))
            .await?;
        plan.validate()?;
        if let Some(enhancer) = &self.scene_enhancer {
            plan = enhancer.enhance(plan, prompt).await?;
            plan.validate()?;
            debug!(scenes = plan.len(), "Scene plan enhanced");
        }
        state.record(StageOutput::Scenes(plan.clone()))?;
        notify(
            reporter,
            ProgressEvent::completed(StageName::Scenes, format!("{} scenes created", plan.len())),
        );

        // Step 3
        let storyboard = match (&self.storyboard_generator, self.use_storyboard) {
            (Some(generator), true) => {
                notify(
                    reporter,
                    ProgressEvent::starting(
                        StageName::Storyboard,
                        "Creating visual storyboards for each scene",
                    ),
                );
                let images = generator.generate(&plan).await?;
                plan.expect_per_scene(StageName::Storyboard.as_str(), images.len())?;
                state.record(StageOutput::Storyboard(images.clone()))?;
                notify(
                    reporter,
                    ProgressEvent::completed(
                        StageName::Storyboard,
                        format!("{} storyboard images created", images.len()),
                    ),
                );
                Some(images)
            }
            _ => {
                notify(
                    reporter,
                    ProgressEvent::skipped(StageName::Storyboard, "Using text-to-video generation"),
                );
                None
            }
        };

        // Step 4
        notify(
            reporter,
            ProgressEvent::starting(
                StageName::Clips,
                "Creating animated video clips for each scene",
            ),
        );
        let clips = self
            .video_generator
            .generate_clips(&plan, storyboard.as_deref())
            .await?;
        plan.expect_per_scene(StageName::Clips.as_str(), clips.len())?;
        state.record(StageOutput::Clips(clips.clone()))?;
        notify(
            reporter,
            ProgressEvent::completed(
                StageName::Clips,
                format!("{} video clips created", clips.len()),
            ),
        );

        // Step 5
        notify(
            reporter,
            ProgressEvent::starting(StageName::Audio, "Creating audio narration from script"),
        );
        let audio = self.audio_generator.generate(&script).await?;
        state.record(StageOutput::Audio(audio.clone()))?;
        notify(
            reporter,
            ProgressEvent::completed(
                StageName::Audio,
                format!("Audio file created: {}", display_name(&audio)),
            ),
        );

        // Step 6
        notify(
            reporter,
            ProgressEvent::starting(StageName::FinalVideo, "Combining video clips with audio"),
        );
        let filename = match options.output_filename() {
            Some(name) => name.clone(),
            None => derive_output_filename(&title, state.run_id()),
        };
        let output = resolve_output_path(&self.output_dir, &filename);
        let video = self.assembler.assemble(&clips, &audio, &output).await?;
        state.record(StageOutput::FinalVideo(video.clone()))?;
        notify(
            reporter,
            ProgressEvent::completed(
                StageName::FinalVideo,
                format!("Final video saved: {}", display_name(&video)),
            ),
        );

        Ok(video)
    }
}

#[track_caller]
fn invalid_option(name: &str, reason: impl Into<String>) -> storyreel_error::StoryreelError {
    ContentError::new(ContentErrorKind::InvalidOption {
        name: name.to_string(),
        reason: reason.into(),
    })
    .into()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Builder for [`Pipeline`].
///
/// The script generator, scene planner, video generator, audio generator,
/// assembler, metadata store and output directory are required. The scene
/// enhancer and storyboard generator are optional; enabling storyboards
/// without a storyboard generator is a configuration error.
#[derive(Default)]
pub struct PipelineBuilder {
    script_generator: Option<Arc<dyn ScriptGenerator>>,
    scene_planner: Option<Arc<dyn ScenePlanner>>,
    scene_enhancer: Option<Arc<dyn SceneEnhancer>>,
    storyboard_generator: Option<Arc<dyn StoryboardGenerator>>,
    video_generator: Option<Arc<dyn VideoGenerator>>,
    audio_generator: Option<Arc<dyn AudioGenerator>>,
    assembler: Option<Arc<dyn VideoAssembler>>,
    metadata_store: Option<Arc<dyn MetadataStore>>,
    output_dir: Option<PathBuf>,
    use_storyboard: Option<bool>,
    default_scene_count: Option<u32>,
    default_scene_duration: Option<f64>,
    clock: Option<Arc<dyn Clock>>,
}

impl PipelineBuilder {
    /// Set the script generator.
    pub fn script_generator(mut self, generator: Arc<dyn ScriptGenerator>) -> Self {
        self.script_generator = Some(generator);
        self
    }

    /// Set the scene planner.
    pub fn scene_planner(mut self, planner: Arc<dyn ScenePlanner>) -> Self {
        self.scene_planner = Some(planner);
        self
    }

    /// Set the optional scene enhancer, applied right after planning.
    pub fn scene_enhancer(mut self, enhancer: Arc<dyn SceneEnhancer>) -> Self {
        self.scene_enhancer = Some(enhancer);
        self
    }

    /// Set the storyboard generator.
    pub fn storyboard_generator(mut self, generator: Arc<dyn StoryboardGenerator>) -> Self {
        self.storyboard_generator = Some(generator);
        self
    }

    /// Set the video clip generator.
    pub fn video_generator(mut self, generator: Arc<dyn VideoGenerator>) -> Self {
        self.video_generator = Some(generator);
        self
    }

    /// Set the voiceover generator.
    pub fn audio_generator(mut self, generator: Arc<dyn AudioGenerator>) -> Self {
        self.audio_generator = Some(generator);
        self
    }

    /// Set the final assembler.
    pub fn assembler(mut self, assembler: Arc<dyn VideoAssembler>) -> Self {
        self.assembler = Some(assembler);
        self
    }

    /// Set the run record store.
    pub fn metadata_store(mut self, store: Arc<dyn MetadataStore>) -> Self {
        self.metadata_store = Some(store);
        self
    }

    /// Set the directory final videos are written to.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Enable or disable the storyboard stage.
    ///
    /// Defaults to enabled when a storyboard generator is set.
    pub fn use_storyboard(mut self, enabled: bool) -> Self {
        self.use_storyboard = Some(enabled);
        self
    }

    /// Scene count used when a run does not override it.
    pub fn default_scene_count(mut self, count: u32) -> Self {
        self.default_scene_count = Some(count);
        self
    }

    /// Scene duration in seconds used when a run does not override it.
    pub fn default_scene_duration(mut self, seconds: f64) -> Self {
        self.default_scene_duration = Some(seconds);
        self
    }

    /// Clock used to derive run ids.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first missing collaborator,
    /// or when storyboards are enabled without a storyboard generator.
    pub fn build(self) -> StoryreelResult<Pipeline> {
        let use_storyboard = self
            .use_storyboard
            .unwrap_or(self.storyboard_generator.is_some());
        if use_storyboard && self.storyboard_generator.is_none() {
            return Err(ConfigError::new(
                "storyboards are enabled but no storyboard generator was provided",
            )
            .into());
        }

        let scene_count = self.default_scene_count.unwrap_or(DEFAULT_SCENE_COUNT);
        if scene_count == 0 {
            return Err(ConfigError::new("default scene count must be at least 1").into());
        }
        let scene_duration = self.default_scene_duration.unwrap_or(DEFAULT_SCENE_DURATION);
        if !scene_duration.is_finite() || scene_duration <= 0.0 {
            return Err(ConfigError::new("default scene duration must be positive").into());
        }

        Ok(Pipeline {
            script_generator: required(self.script_generator, "script generator")?,
            scene_planner: required(self.scene_planner, "scene planner")?,
            scene_enhancer: self.scene_enhancer,
            storyboard_generator: self.storyboard_generator,
            video_generator: required(self.video_generator, "video generator")?,
            audio_generator: required(self.audio_generator, "audio generator")?,
            assembler: required(self.assembler, "video assembler")?,
            metadata_store: required(self.metadata_store, "metadata store")?,
            output_dir: required(self.output_dir, "output directory")?,
            use_storyboard,
            default_scene_count: scene_count,
            default_scene_duration: scene_duration,
            run_ids: RunIdGenerator::new(self.clock.unwrap_or_else(|| Arc::new(SystemClock))),
        })
    }
}

#[track_caller]
fn required<T>(value: Option<T>, what: &str) -> StoryreelResult<T> {
    match value {
        Some(value) => Ok(value),
        None => Err(ConfigError::new(format!("pipeline requires a {what}")).into()),
    }
}
