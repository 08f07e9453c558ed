//! Stage orchestration for Storyreel.
//!
//! [`Pipeline`] runs the six stages (script, scene plan, optional storyboard,
//! clips, voiceover, assembly) strictly in order, records each output in a
//! [`RunState`](storyreel_core::RunState), reports progress around every
//! stage, and always hands back a [`RunResult`](storyreel_core::RunResult),
//! persisting the run record whether or not the run succeeded.
//!
//! The crate also provides the stage transforms that need no external
//! service of their own: the language-model backed [`LlmScriptGenerator`] and
//! [`LlmScenePlanner`], the deterministic [`CinematicEnhancer`], and the
//! ffmpeg-driven [`FfmpegAssembler`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assembler;
mod enhancer;
mod extraction;
mod filename;
mod options;
mod pipeline;
mod reporter;
mod scene_planner;
mod script_generator;

pub use assembler::FfmpegAssembler;
pub use enhancer::CinematicEnhancer;
pub use extraction::{extract_json, parse_json};
pub use filename::{derive_output_filename, resolve_output_path};
pub use options::{RunOptions, RunOptionsBuilder};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use reporter::{ChannelReporter, NoopReporter, TracingReporter};
pub use scene_planner::LlmScenePlanner;
pub use script_generator::LlmScriptGenerator;
