//! Configuration structures and layered loading.
//!
//! Sources, in increasing precedence:
//! 1. Bundled defaults (include_str! from storyreel.toml)
//! 2. `~/.config/storyreel/storyreel.toml`
//! 3. `./storyreel.toml`
//! 4. `STORYREEL__SECTION__KEY` environment variables

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use storyreel_error::{ConfigError, StoryreelError, StoryreelResult};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../storyreel.toml");

/// Where run artifacts and metadata records are written.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Root output directory
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Orchestrator behaviour switches and per-run defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PipelineSettings {
    /// Generate storyboard images before clips
    #[serde(default = "default_true")]
    pub use_storyboard: bool,

    /// Rewrite visual descriptions with cinematic vocabulary after planning
    #[serde(default = "default_true")]
    pub use_cinematic_enhancement: bool,

    /// Scenes per video unless overridden per run
    #[serde(default = "default_scene_count")]
    pub default_scene_count: u32,

    /// Seconds per scene unless overridden per run
    #[serde(default = "default_scene_duration")]
    pub default_scene_duration: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            use_storyboard: true,
            use_cinematic_enhancement: true,
            default_scene_count: default_scene_count(),
            default_scene_duration: default_scene_duration(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_scene_count() -> u32 {
    5
}

fn default_scene_duration() -> f64 {
    6.0
}

/// OpenAI settings (script, scene planning, optional speech).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OpenAiConfig {
    /// API key
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL
    #[serde(default = "default_openai_url")]
    pub base_url: String,
    /// Chat model
    #[serde(default = "default_openai_model")]
    pub model: String,
    /// Token cap for script generation
    #[serde(default = "default_script_max_tokens")]
    pub script_max_tokens: u32,
    /// Token cap for scene planning
    #[serde(default = "default_scene_max_tokens")]
    pub scene_max_tokens: u32,
    /// Speech model
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    /// Speech voice
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_url(),
            model: default_openai_model(),
            script_max_tokens: default_script_max_tokens(),
            scene_max_tokens: default_scene_max_tokens(),
            tts_model: default_tts_model(),
            tts_voice: default_tts_voice(),
        }
    }
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_script_max_tokens() -> u32 {
    1000
}

fn default_scene_max_tokens() -> u32 {
    2000
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_tts_voice() -> String {
    "alloy".to_string()
}

/// Replicate settings (storyboard images and video clips).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReplicateConfig {
    /// API token
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,
    /// API base URL
    #[serde(default = "default_replicate_url")]
    pub base_url: String,
    /// Text-to-image model (`owner/name` or `owner/name:version`)
    #[serde(default = "default_storyboard_model")]
    pub storyboard_model: String,
    /// Image-to-video model
    #[serde(default = "default_video_model")]
    pub video_model: String,
    /// Text-to-video model used when no storyboard is available
    #[serde(default = "default_text_to_video_model")]
    pub text_to_video_model: String,
    /// Delay between prediction status checks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Status checks before a prediction is abandoned
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: default_replicate_url(),
            storyboard_model: default_storyboard_model(),
            video_model: default_video_model(),
            text_to_video_model: default_text_to_video_model(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

fn default_replicate_url() -> String {
    "https://api.replicate.com/v1".to_string()
}

fn default_storyboard_model() -> String {
    "stability-ai/sdxl".to_string()
}

fn default_video_model() -> String {
    "stability-ai/stable-video-diffusion".to_string()
}

fn default_text_to_video_model() -> String {
    "anotherjesse/zeroscope-v2-xl".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_max_poll_attempts() -> u32 {
    300
}

/// ElevenLabs settings (voiceover).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ElevenLabsConfig {
    /// API key
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL
    #[serde(default = "default_elevenlabs_url")]
    pub base_url: String,
    /// Voice identifier
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    /// Speech model identifier
    #[serde(default = "default_elevenlabs_model")]
    pub model_id: String,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_elevenlabs_url(),
            voice_id: default_voice_id(),
            model_id: default_elevenlabs_model(),
        }
    }
}

fn default_elevenlabs_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_voice_id() -> String {
    "21m00Tcm4TlvDq8Ikt6e".to_string()
}

fn default_elevenlabs_model() -> String {
    "eleven_multilingual_v2".to_string()
}

/// Credentials and model choices per provider.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// OpenAI
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Replicate
    #[serde(default)]
    pub replicate: ReplicateConfig,
    /// ElevenLabs
    #[serde(default)]
    pub elevenlabs: ElevenLabsConfig,
}

/// Speech synthesis providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum TtsProvider {
    /// ElevenLabs text-to-speech
    #[default]
    #[serde(rename = "elevenlabs")]
    ElevenLabs,
    /// OpenAI speech endpoint
    #[serde(rename = "openai")]
    OpenAi,
}

/// Video generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum VideoProvider {
    /// Replicate predictions
    #[default]
    #[serde(rename = "replicate")]
    Replicate,
}

/// Voiceover stage settings.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct AudioConfig {
    /// Which provider synthesizes narration
    #[serde(default)]
    pub provider: TtsProvider,
}

/// Clip stage settings.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct VideoConfig {
    /// Which provider generates storyboards and clips
    #[serde(default)]
    pub provider: VideoProvider,
}

/// Final assembly settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AssemblyConfig {
    /// ffmpeg executable name or path
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

/// Backoff for transient provider failures (HTTP 408/429/5xx, dropped connections).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetrySettings {
    /// First backoff delay
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Retries after the first attempt; zero disables retrying
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// Upper bound on a single delay
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff_ms(),
            max_retries: default_max_retries(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

fn default_initial_backoff_ms() -> u64 {
    2000
}

fn default_max_retries() -> usize {
    3
}

fn default_max_delay_secs() -> u64 {
    60
}

/// Top-level Storyreel configuration.
///
/// # Example
///
/// ```no_run
/// use storyreel_config::StoryreelConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryreelConfig::load()?;
/// println!("Writing videos to {}", config.output.dir.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct StoryreelConfig {
    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,
    /// Orchestrator settings
    #[serde(default)]
    pub pipeline: PipelineSettings,
    /// Provider credentials and models
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Voiceover provider selection
    #[serde(default)]
    pub audio: AudioConfig,
    /// Video provider selection
    #[serde(default)]
    pub video: VideoConfig,
    /// Assembly settings
    #[serde(default)]
    pub assembly: AssemblyConfig,
    /// Provider retry policy
    #[serde(default)]
    pub retry: RetrySettings,
}

impl StoryreelConfig {
    /// Load configuration with precedence: environment > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped when absent.
    #[instrument]
    pub fn load() -> StoryreelResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyreel/storyreel.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("storyreel").required(false))
            .add_source(Environment::with_prefix("STORYREEL").separator("__"));

        Self::finish(builder.build())
    }

    /// Load bundled defaults overlaid with one specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> StoryreelResult<Self> {
        debug!("Loading configuration from file");

        let config = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build();

        Self::finish(config)
    }

    /// Parse bundled defaults overlaid with an inline TOML document.
    pub fn from_toml_str(toml: &str) -> StoryreelResult<Self> {
        let config = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build();
        Self::finish(config)
    }

    fn finish(built: Result<Config, config::ConfigError>) -> StoryreelResult<Self> {
        let config: Self = built
            .map_err(|e| {
                StoryreelError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryreelError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Fill missing credentials from the conventional provider variables
    /// (`OPENAI_API_KEY`, `REPLICATE_API_TOKEN`, `ELEVENLABS_API_KEY`).
    ///
    /// `lookup` is supplied by the caller, typically the binary at startup,
    /// so that library code never touches the process environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyreel_config::StoryreelConfig;
    ///
    /// let mut config = StoryreelConfig::default();
    /// config.apply_credential_fallbacks(|name| {
    ///     (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
    /// });
    /// assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-test"));
    /// assert!(config.providers.replicate.api_token.is_none());
    /// ```
    pub fn apply_credential_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut Option<String>, name: &str| {
            if slot.as_deref().is_none_or(str::is_empty) {
                if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                    debug!(variable = name, "Using credential fallback");
                    *slot = Some(value);
                }
            }
        };

        fill(&mut self.providers.openai.api_key, "OPENAI_API_KEY");
        fill(&mut self.providers.replicate.api_token, "REPLICATE_API_TOKEN");
        fill(&mut self.providers.elevenlabs.api_key, "ELEVENLABS_API_KEY");
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero scene count or a
    /// non-positive scene duration.
    pub fn validate(&self) -> StoryreelResult<()> {
        if self.pipeline.default_scene_count == 0 {
            return Err(ConfigError::new("pipeline.default_scene_count must be at least 1").into());
        }
        let duration = self.pipeline.default_scene_duration;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ConfigError::new(format!(
                "pipeline.default_scene_duration must be positive, got {}",
                duration
            ))
            .into());
        }
        if self.providers.replicate.poll_interval_ms == 0 {
            return Err(ConfigError::new("providers.replicate.poll_interval_ms must be positive").into());
        }
        Ok(())
    }

    /// OpenAI API key.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the key is missing or empty.
    pub fn require_openai_key(&self) -> StoryreelResult<&str> {
        require(&self.providers.openai.api_key, "OpenAI API key is required (providers.openai.api_key)")
    }

    /// Replicate API token.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the token is missing or empty.
    pub fn require_replicate_token(&self) -> StoryreelResult<&str> {
        require(
            &self.providers.replicate.api_token,
            "Replicate API token is required (providers.replicate.api_token)",
        )
    }

    /// ElevenLabs API key.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the key is missing or empty.
    pub fn require_elevenlabs_key(&self) -> StoryreelResult<&str> {
        require(
            &self.providers.elevenlabs.api_key,
            "ElevenLabs API key is required (providers.elevenlabs.api_key)",
        )
    }

    /// Directories that must exist before the first run.
    pub fn output_directories(&self) -> Vec<PathBuf> {
        let root = &self.output.dir;
        vec![
            root.clone(),
            root.join("storyboards"),
            root.join("clips"),
            root.join("audio"),
        ]
    }
}

#[track_caller]
fn require<'a>(value: &'a Option<String>, message: &str) -> StoryreelResult<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::new(message).into()),
    }
}
