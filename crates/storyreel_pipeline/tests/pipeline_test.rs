//! End-to-end orchestration tests with in-process stage transforms.

use async_trait::async_trait;
use chrono::{Local, TimeZone};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use storyreel_core::{
    FixedClock, ProgressEvent, ProgressStatus, RunId, RunState, SceneBuilder, ScenePlan,
    ScriptOutput, StageName,
};
use storyreel_error::{
    ProviderError, ProviderErrorKind, StorageError, StorageErrorKind, StoryreelResult,
};
use storyreel_interface::{
    AudioGenerator, CompletionRequest, MetadataStore, ProgressReporter, ScenePlanner,
    ScriptGenerator, StoryboardGenerator, TextDriver, VideoAssembler, VideoGenerator,
};
use storyreel_pipeline::{
    ChannelReporter, CinematicEnhancer, LlmScriptGenerator, Pipeline, PipelineBuilder, RunOptions,
};

type Log = Arc<Mutex<Vec<String>>>;

fn push(log: &Log, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

fn plan(count: u32, duration: f64) -> ScenePlan {
    ScenePlan::new(
        (1..=count)
            .map(|n| {
                SceneBuilder::default()
                    .scene_number(n)
                    .narration(format!("Narration {n}"))
                    .visual_description(format!("Raindrop refracting light, shot {n}"))
                    .duration(duration)
                    .build()
                    .unwrap()
            })
            .collect(),
    )
}

struct MockScript {
    log: Log,
}

#[async_trait]
impl ScriptGenerator for MockScript {
    async fn generate(&self, prompt: &str) -> StoryreelResult<ScriptOutput> {
        push(&self.log, format!("script:{prompt}"));
        Ok(ScriptOutput::new(
            "How Rainbows Form",
            "Sunlight enters a raindrop, bends, reflects and splits into colours.",
        ))
    }
}

struct MockPlanner {
    log: Log,
    /// Scenes returned regardless of the requested count
    fixed: Option<ScenePlan>,
}

#[async_trait]
impl ScenePlanner for MockPlanner {
    async fn create_plan(
        &self,
        _script: &ScriptOutput,
        target_scenes: Option<u32>,
        scene_duration: Option<f64>,
    ) -> StoryreelResult<ScenePlan> {
        let count = target_scenes.unwrap_or(5);
        let duration = scene_duration.unwrap_or(6.0);
        push(&self.log, format!("scenes:{count}:{duration}"));
        Ok(self.fixed.clone().unwrap_or_else(|| plan(count, duration)))
    }
}

struct MockStoryboard {
    log: Log,
}

#[async_trait]
impl StoryboardGenerator for MockStoryboard {
    async fn generate(&self, plan: &ScenePlan) -> StoryreelResult<Vec<String>> {
        push(&self.log, "storyboard");
        Ok(plan
            .scenes()
            .iter()
            .map(|s| format!("storyboards/scene_{}.png", s.scene_number()))
            .collect())
    }
}

#[derive(Default)]
struct MockVideo {
    log: Log,
    fail: bool,
    received_storyboard: Mutex<Option<Option<Vec<String>>>>,
}

#[async_trait]
impl VideoGenerator for MockVideo {
    async fn generate_clips(
        &self,
        plan: &ScenePlan,
        storyboard: Option<&[String]>,
    ) -> StoryreelResult<Vec<PathBuf>> {
        push(&self.log, "clips");
        *self.received_storyboard.lock().unwrap() = Some(storyboard.map(<[String]>::to_vec));
        if self.fail {
            return Err(ProviderError::new(ProviderErrorKind::Status {
                provider: "replicate".to_string(),
                status_code: 503,
                message: "Service Unavailable".to_string(),
            })
            .into());
        }
        Ok(plan
            .scenes()
            .iter()
            .map(|s| PathBuf::from(format!("clips/scene_{}.mp4", s.scene_number())))
            .collect())
    }
}

struct MockAudio {
    log: Log,
}

#[async_trait]
impl AudioGenerator for MockAudio {
    async fn generate(&self, _script: &ScriptOutput) -> StoryreelResult<PathBuf> {
        push(&self.log, "audio");
        Ok(PathBuf::from("audio/narration.mp3"))
    }
}

struct MockAssembler {
    log: Log,
}

#[async_trait]
impl VideoAssembler for MockAssembler {
    async fn assemble(
        &self,
        clips: &[PathBuf],
        _audio: &Path,
        output: &Path,
    ) -> StoryreelResult<PathBuf> {
        push(&self.log, format!("assemble:{}", clips.len()));
        std::fs::write(output, b"mp4").unwrap();
        Ok(output.to_path_buf())
    }
}

#[derive(Default)]
struct MemoryStore {
    saved: Mutex<Vec<RunState>>,
    fail: bool,
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn persist(&self, state: &RunState) -> StoryreelResult<PathBuf> {
        if self.fail {
            return Err(StorageError::new(StorageErrorKind::MissingDirectory(
                "/nowhere".to_string(),
            ))
            .into());
        }
        self.saved.lock().unwrap().push(state.clone());
        Ok(PathBuf::from(format!("project_{}.json", state.run_id())))
    }

    async fn load(&self, run_id: &RunId) -> StoryreelResult<RunState> {
        self.saved
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.run_id() == run_id)
            .cloned()
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound(run_id.to_string())).into()
            })
    }
}

struct Harness {
    log: Log,
    video: Arc<MockVideo>,
    store: Arc<MemoryStore>,
    dir: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        Self::with(false, false)
    }

    fn with(fail_video: bool, fail_store: bool) -> Self {
        let log = Log::default();
        Self {
            video: Arc::new(MockVideo {
                log: log.clone(),
                fail: fail_video,
                ..Default::default()
            }),
            store: Arc::new(MemoryStore {
                fail: fail_store,
                ..Default::default()
            }),
            log,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn builder(&self) -> PipelineBuilder {
        let clock = FixedClock::new(Local.with_ymd_and_hms(2026, 10, 19, 14, 5, 9).unwrap());
        Pipeline::builder()
            .script_generator(Arc::new(MockScript {
                log: self.log.clone(),
            }))
            .scene_planner(Arc::new(MockPlanner {
                log: self.log.clone(),
                fixed: None,
            }))
            .storyboard_generator(Arc::new(MockStoryboard {
                log: self.log.clone(),
            }))
            .video_generator(self.video.clone())
            .audio_generator(Arc::new(MockAudio {
                log: self.log.clone(),
            }))
            .assembler(Arc::new(MockAssembler {
                log: self.log.clone(),
            }))
            .metadata_store(self.store.clone())
            .output_dir(self.dir.path())
            .clock(Arc::new(clock))
    }

    fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn saved(&self) -> Vec<RunState> {
        self.store.saved.lock().unwrap().clone()
    }
}

fn drain(receiver: &mut tokio::sync::mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_full_run_succeeds() {
    let harness = Harness::new();
    let pipeline = harness.builder().build().unwrap();

    let result = pipeline
        .run("Explain how rainbows form", RunOptions::default())
        .await;

    assert!(*result.success(), "run failed: {:?}", result.error());
    let video = result.video_path().as_ref().unwrap();
    assert_eq!(
        video.file_name().unwrap().to_str().unwrap(),
        "How_Rainbows_Form_20261019_140509.mp4"
    );
    assert!(video.starts_with(harness.dir.path()));

    let scenes = result.scenes().as_ref().unwrap();
    assert_eq!(scenes.len(), 5);
    assert!(scenes.total_duration() >= 30.0);
    assert_eq!(result.script().as_ref().unwrap().title(), "How Rainbows Form");

    let names = result.project_data().stages().names();
    assert_eq!(
        names,
        vec![
            StageName::Script,
            StageName::Scenes,
            StageName::Storyboard,
            StageName::Clips,
            StageName::Audio,
            StageName::FinalVideo,
        ]
    );
    assert_eq!(harness.saved().len(), 1);
    assert_eq!(harness.saved()[0].stages().len(), 6);
}

#[tokio::test]
async fn test_stages_run_in_order_with_notifications_between() {
    let harness = Harness::new();
    let pipeline = harness.builder().build().unwrap();

    let log = harness.log.clone();
    let reporter = move |event: &ProgressEvent| {
        push(&log, format!("{}:{}", event.step(), event.status()));
    };
    let options = RunOptions::builder()
        .reporter(Arc::new(reporter))
        .build()
        .unwrap();

    let result = pipeline.run("Explain how rainbows form", options).await;
    assert!(*result.success());

    assert_eq!(
        harness.entries(),
        vec![
            "1:starting",
            "script:Explain how rainbows form",
            "1:completed",
            "2:starting",
            "scenes:5:6",
            "2:completed",
            "3:starting",
            "storyboard",
            "3:completed",
            "4:starting",
            "clips",
            "4:completed",
            "5:starting",
            "audio",
            "5:completed",
            "6:starting",
            "assemble:5",
            "6:completed",
        ]
    );
}

#[tokio::test]
async fn test_progress_details() {
    let harness = Harness::new();
    let pipeline = harness.builder().build().unwrap();
    let (reporter, mut events) = ChannelReporter::new();

    let options = RunOptions::builder()
        .reporter(Arc::new(reporter))
        .build()
        .unwrap();
    pipeline.run("Explain how rainbows form", options).await;

    let completed: Vec<String> = drain(&mut events)
        .into_iter()
        .filter(|e| *e.status() == ProgressStatus::Completed)
        .map(|e| e.detail().clone())
        .collect();
    assert_eq!(
        completed,
        vec![
            "Title: How Rainbows Form".to_string(),
            "5 scenes created".to_string(),
            "5 storyboard images created".to_string(),
            "5 video clips created".to_string(),
            "Audio file created: narration.mp3".to_string(),
            "Final video saved: How_Rainbows_Form_20261019_140509.mp4".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_storyboard_disabled_skips_step_three() {
    let harness = Harness::new();
    let pipeline = harness.builder().use_storyboard(false).build().unwrap();
    let (reporter, mut events) = ChannelReporter::new();

    let options = RunOptions::builder()
        .reporter(Arc::new(reporter))
        .build()
        .unwrap();
    let result = pipeline.run("Explain how rainbows form", options).await;

    assert!(*result.success());
    let step_three: Vec<ProgressEvent> = drain(&mut events)
        .into_iter()
        .filter(|e| *e.step() == 3)
        .collect();
    assert_eq!(step_three.len(), 1);
    assert_eq!(*step_three[0].status(), ProgressStatus::Skipped);
    assert_eq!(step_three[0].detail(), "Using text-to-video generation");

    assert!(!harness.entries().contains(&"storyboard".to_string()));
    assert_eq!(*harness.video.received_storyboard.lock().unwrap(), Some(None));
    assert!(
        !result
            .project_data()
            .stages()
            .contains(StageName::Storyboard)
    );
}

#[tokio::test]
async fn test_storyboard_paths_reach_video_stage() {
    let harness = Harness::new();
    let pipeline = harness.builder().build().unwrap();

    pipeline.run("rainbows", RunOptions::default()).await;

    let received = harness.video.received_storyboard.lock().unwrap().clone();
    let images = received.flatten().unwrap();
    assert_eq!(images.len(), 5);
    assert_eq!(images[0], "storyboards/scene_1.png");
}

struct MalformedDriver;

#[async_trait]
impl TextDriver for MalformedDriver {
    async fn complete(&self, _request: &CompletionRequest) -> StoryreelResult<String> {
        Ok(r#"{"title": "How Rainbows Form", "script": }"#.to_string())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "malformed"
    }
}

#[tokio::test]
async fn test_script_parse_failure_persists_empty_state() {
    let harness = Harness::new();
    let pipeline = harness
        .builder()
        .script_generator(Arc::new(LlmScriptGenerator::new(MalformedDriver)))
        .build()
        .unwrap();

    let result = pipeline
        .run("Explain how rainbows form", RunOptions::default())
        .await;

    assert!(!result.success());
    assert!(result.video_path().is_none());
    let error = result.error().as_ref().unwrap();
    assert!(error.contains("Failed to parse script response"), "{error}");
    assert!(result.project_data().stages().is_empty());
    assert!(result.script().is_none());

    let saved = harness.saved();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].stages().is_empty());
    assert_eq!(saved[0].prompt(), "Explain how rainbows form");
}

#[tokio::test]
async fn test_video_failure_keeps_script_and_scenes() {
    let harness = Harness::with(true, false);
    let pipeline = harness.builder().use_storyboard(false).build().unwrap();

    let result = pipeline
        .run("Explain how rainbows form", RunOptions::default())
        .await;

    assert!(!result.success());
    assert!(result.error().as_ref().unwrap().contains("HTTP 503"));
    assert_eq!(
        result.project_data().stages().names(),
        vec![StageName::Script, StageName::Scenes]
    );
    assert!(result.script().is_some());
    assert!(result.scenes().is_some());

    let saved = harness.saved();
    assert_eq!(saved[0].stages().names(), vec![StageName::Script, StageName::Scenes]);
    assert!(!harness.entries().contains(&"audio".to_string()));
}

#[tokio::test]
async fn test_empty_prompt_fails_without_calling_stages() {
    let harness = Harness::new();
    let pipeline = harness.builder().build().unwrap();

    let result = pipeline.run("   ", RunOptions::default()).await;

    assert!(!result.success());
    assert!(result.error().as_ref().unwrap().contains("Prompt cannot be empty"));
    assert!(harness.entries().is_empty());
    assert_eq!(harness.saved().len(), 1);
}

#[tokio::test]
async fn test_persistence_failure_does_not_change_outcome() {
    let harness = Harness::with(false, true);
    let pipeline = harness.builder().build().unwrap();

    let result = pipeline.run("rainbows", RunOptions::default()).await;

    assert!(*result.success());
    assert!(result.error().is_none());
}

struct Exploding;

impl ProgressReporter for Exploding {
    fn report(&self, _event: &ProgressEvent) {
        panic!("progress sink exploded");
    }
}

#[tokio::test]
async fn test_panicking_reporter_does_not_abort_run() {
    let harness = Harness::new();
    let pipeline = harness.builder().build().unwrap();

    let options = RunOptions::builder()
        .reporter(Arc::new(Exploding))
        .build()
        .unwrap();
    let result = pipeline.run("rainbows", options).await;

    assert!(*result.success());
    assert_eq!(result.project_data().stages().len(), 6);
}

#[tokio::test]
async fn test_run_options_override_defaults() {
    let harness = Harness::new();
    let pipeline = harness
        .builder()
        .default_scene_count(4)
        .default_scene_duration(7.5)
        .build()
        .unwrap();

    let options = RunOptions::builder()
        .scene_count(3u32)
        .scene_duration(4.0)
        .output_filename("custom.mp4")
        .build()
        .unwrap();
    let result = pipeline.run("rainbows", options).await;
    assert!(*result.success());
    assert_eq!(
        result.video_path().as_ref().unwrap(),
        &harness.dir.path().join("custom.mp4")
    );
    assert!(harness.entries().contains(&"scenes:3:4".to_string()));

    let second = pipeline.run("rainbows", RunOptions::default()).await;
    assert!(harness.entries().contains(&"scenes:4:7.5".to_string()));
    assert_eq!(second.scenes().as_ref().unwrap().len(), 4);
}

#[tokio::test]
async fn test_same_second_runs_never_overwrite() {
    let harness = Harness::new();
    let pipeline = harness.builder().build().unwrap();

    let options = || RunOptions::builder().output_filename("same.mp4").build().unwrap();
    let first = pipeline.run("rainbows", options()).await;
    let second = pipeline.run("rainbows", options()).await;

    assert_eq!(
        first.video_path().as_ref().unwrap(),
        &harness.dir.path().join("same.mp4")
    );
    assert_eq!(
        second.video_path().as_ref().unwrap(),
        &harness.dir.path().join("same-2.mp4")
    );
    assert_eq!(first.project_data().run_id().as_str(), "20261019_140509");
    assert_eq!(second.project_data().run_id().as_str(), "20261019_140509_2");
}

#[tokio::test]
async fn test_clip_count_mismatch_is_content_error() {
    struct ShortVideo;

    #[async_trait]
    impl VideoGenerator for ShortVideo {
        async fn generate_clips(
            &self,
            _plan: &ScenePlan,
            _storyboard: Option<&[String]>,
        ) -> StoryreelResult<Vec<PathBuf>> {
            Ok(vec![PathBuf::from("clips/scene_1.mp4")])
        }
    }

    let harness = Harness::new();
    let pipeline = harness
        .builder()
        .video_generator(Arc::new(ShortVideo))
        .build()
        .unwrap();

    let result = pipeline.run("rainbows", RunOptions::default()).await;
    assert!(!result.success());
    assert!(
        result
            .error()
            .as_ref()
            .unwrap()
            .contains("clips produced 1 items for 5 scenes")
    );
    assert_eq!(result.project_data().stages().len(), 3);
}

#[tokio::test]
async fn test_invalid_plan_from_planner_fails_run() {
    let harness = Harness::new();
    let mut broken = plan(2, 6.0).into_scenes();
    broken[1] = broken[1].clone().with_scene_number(7);
    let pipeline = harness
        .builder()
        .scene_planner(Arc::new(MockPlanner {
            log: harness.log.clone(),
            fixed: Some(ScenePlan::new(broken)),
        }))
        .build()
        .unwrap();

    let result = pipeline.run("rainbows", RunOptions::default()).await;
    assert!(!result.success());
    assert!(result.error().as_ref().unwrap().contains("Invalid scene plan"));
    assert_eq!(
        result.project_data().stages().names(),
        vec![StageName::Script]
    );
}

#[tokio::test]
async fn test_enhancer_rewrites_visuals_before_recording() {
    let harness = Harness::new();
    let pipeline = harness
        .builder()
        .scene_enhancer(Arc::new(CinematicEnhancer::new()))
        .build()
        .unwrap();

    let result = pipeline
        .run("Explain how rainbows form", RunOptions::default())
        .await;
    let scenes = result.scenes().as_ref().unwrap();
    assert!(
        scenes.scenes()[0]
            .visual_description()
            .starts_with("Wide establishing shot")
    );
    assert_eq!(scenes.scenes()[0].narration(), "Narration 1");
}

#[test]
fn test_builder_requires_collaborators() {
    let err = Pipeline::builder().build().unwrap_err();
    assert!(err.to_string().contains("Configuration Error"));

    let harness = Harness::new();
    let pipeline = harness.builder().build().unwrap();
    assert!(pipeline.use_storyboard());
}

#[test]
fn test_storyboard_enabled_without_generator_is_rejected() {
    let log = Log::default();
    let dir = tempfile::tempdir().unwrap();
    let err = Pipeline::builder()
        .script_generator(Arc::new(MockScript { log: log.clone() }))
        .scene_planner(Arc::new(MockPlanner {
            log: log.clone(),
            fixed: None,
        }))
        .video_generator(Arc::new(MockVideo::default()))
        .audio_generator(Arc::new(MockAudio { log: log.clone() }))
        .assembler(Arc::new(MockAssembler { log }))
        .metadata_store(Arc::new(MemoryStore::default()))
        .output_dir(dir.path())
        .use_storyboard(true)
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("no storyboard generator"));
}

fn unavailable(provider: &str) -> storyreel_error::StoryreelError {
    ProviderError::new(ProviderErrorKind::Status {
        provider: provider.to_string(),
        status_code: 503,
        message: "Service Unavailable".to_string(),
    })
    .into()
}

struct FailingStoryboard;

#[async_trait]
impl StoryboardGenerator for FailingStoryboard {
    async fn generate(&self, _plan: &ScenePlan) -> StoryreelResult<Vec<String>> {
        Err(unavailable("replicate"))
    }
}

struct FailingAudio;

#[async_trait]
impl AudioGenerator for FailingAudio {
    async fn generate(&self, _script: &ScriptOutput) -> StoryreelResult<PathBuf> {
        Err(unavailable("elevenlabs"))
    }
}

struct FailingAssembler;

#[async_trait]
impl VideoAssembler for FailingAssembler {
    async fn assemble(
        &self,
        _clips: &[PathBuf],
        _audio: &Path,
        _output: &Path,
    ) -> StoryreelResult<PathBuf> {
        Err(ProviderError::new(ProviderErrorKind::Process {
            program: "ffmpeg".to_string(),
            message: "exited with status 1".to_string(),
        })
        .into())
    }
}

#[tokio::test]
async fn test_late_stage_failures_leave_exact_prefix() {
    let cases = [
        ("storyboard", vec![StageName::Script, StageName::Scenes]),
        (
            "audio",
            vec![
                StageName::Script,
                StageName::Scenes,
                StageName::Storyboard,
                StageName::Clips,
            ],
        ),
        (
            "assembly",
            vec![
                StageName::Script,
                StageName::Scenes,
                StageName::Storyboard,
                StageName::Clips,
                StageName::Audio,
            ],
        ),
    ];

    for (failing, expected) in cases {
        let harness = Harness::new();
        let builder = harness.builder();
        let builder = match failing {
            "storyboard" => builder.storyboard_generator(Arc::new(FailingStoryboard)),
            "audio" => builder.audio_generator(Arc::new(FailingAudio)),
            _ => builder.assembler(Arc::new(FailingAssembler)),
        };
        let pipeline = builder.build().unwrap();

        let result = pipeline.run("rainbows", RunOptions::default()).await;

        assert!(!*result.success(), "{failing} failure must fail the run");
        assert!(result.video_path().is_none(), "{failing}");
        assert!(result.error().is_some(), "{failing}");
        assert!(result.project_data().final_video().is_none(), "{failing}");
        assert_eq!(result.project_data().stages().names(), expected, "{failing}");

        let saved = harness.saved();
        assert_eq!(saved.len(), 1, "{failing}");
        assert_eq!(&saved[0], result.project_data(), "{failing}");
    }
}

#[tokio::test]
async fn test_out_of_range_run_options_fail_before_any_stage() {
    let zero_scenes = RunOptions::builder().scene_count(0u32).build().unwrap();
    let negative = RunOptions::builder().scene_duration(-3.0).build().unwrap();
    let not_finite = RunOptions::builder()
        .scene_duration(f64::NAN)
        .build()
        .unwrap();

    for (options, option_name) in [
        (zero_scenes, "scene_count"),
        (negative, "scene_duration"),
        (not_finite, "scene_duration"),
    ] {
        let harness = Harness::new();
        let pipeline = harness.builder().build().unwrap();

        let result = pipeline.run("rainbows", options).await;

        assert!(!*result.success());
        let error = result.error().as_ref().unwrap();
        assert!(
            error.contains(&format!("Invalid run option {option_name}")),
            "{error}"
        );
        assert!(harness.entries().is_empty());
        assert!(result.project_data().stages().is_empty());
        assert_eq!(harness.saved().len(), 1);
    }
}
