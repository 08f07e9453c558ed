//! Storyreel - prompt to narrated short video.
//!
//! Storyreel turns one text prompt into a finished video by running six
//! stages in order: a language model writes a narration script and splits
//! it into scenes, an image model draws a storyboard frame per scene, a
//! video model animates each scene, a speech model records the voiceover,
//! and ffmpeg stitches clips and narration into the final file. Every run
//! leaves a JSON record of what each stage produced.
//!
//! # Quick Start
//!
//! ```no_run
//! use storyreel::{RunOptions, StoryreelConfig, build_pipeline};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = StoryreelConfig::load()?;
//! config.apply_credential_fallbacks(|name| std::env::var(name).ok());
//!
//! let pipeline = build_pipeline(&config)?;
//! let result = pipeline
//!     .run("Explain how rainbows form", RunOptions::default())
//!     .await;
//! println!("{:?}", result.video_path());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `storyreel_error` - Error types
//! - `storyreel_core` - Run state, scene plans, progress events
//! - `storyreel_interface` - Stage transform traits
//! - `storyreel_config` - Layered configuration
//! - `storyreel_storage` - Run record persistence
//! - `storyreel_models` - OpenAI, Replicate and ElevenLabs adapters
//! - `storyreel_pipeline` - Orchestrator and local transforms
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod wiring;

pub use storyreel_config::*;
pub use storyreel_core::*;
pub use storyreel_error::*;
pub use storyreel_interface::*;
pub use storyreel_models::*;
pub use storyreel_pipeline::*;
pub use storyreel_storage::{FileSystemMetadataStore, ensure_directories};

pub use wiring::build_pipeline;
