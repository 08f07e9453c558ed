//! Configuration for the Storyreel pipeline.
//!
//! Configuration is resolved once at process start and then passed by
//! reference to every component constructor. Components never read the
//! process environment themselves; credential fallbacks from well-known
//! variables are applied explicitly through
//! [`StoryreelConfig::apply_credential_fallbacks`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod settings;

pub use settings::{
    AssemblyConfig, AudioConfig, ElevenLabsConfig, OpenAiConfig, OutputConfig, PipelineSettings,
    ProvidersConfig, ReplicateConfig, RetrySettings, StoryreelConfig, TtsProvider, VideoConfig,
    VideoProvider,
};
