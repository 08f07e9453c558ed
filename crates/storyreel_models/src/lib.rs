//! Generative provider integrations for Storyreel.
//!
//! Each adapter implements one of the traits from `storyreel_interface` on
//! top of a hosted API:
//!
//! - **OpenAI**: chat completions ([`OpenAiChatDriver`]) and speech
//!   ([`OpenAiSpeechGenerator`])
//! - **ElevenLabs**: speech ([`ElevenLabsSpeechGenerator`])
//! - **Replicate**: storyboard images ([`ReplicateStoryboardGenerator`]) and
//!   video clips ([`ReplicateVideoGenerator`]) through the prediction API
//!
//! Adapters are built from a [`StoryreelConfig`](storyreel_config::StoryreelConfig)
//! and fail at construction when their credential is missing. Transient HTTP
//! failures are retried with exponential backoff according to a
//! [`RetryPolicy`].
//!
//! # Example
//!
//! ```no_run
//! use storyreel_config::StoryreelConfig;
//! use storyreel_interface::{CompletionRequestBuilder, TextDriver};
//! use storyreel_models::OpenAiChatDriver;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoryreelConfig::load()?;
//! let driver = OpenAiChatDriver::from_config(&config)?;
//! let request = CompletionRequestBuilder::default()
//!     .user("Name three colours of the rainbow")
//!     .build()?;
//! println!("{}", driver.complete(&request).await?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifacts;
mod elevenlabs;
mod http;
mod openai;
mod replicate;
mod retry;

pub use elevenlabs::ElevenLabsSpeechGenerator;
pub use openai::{OpenAiChatDriver, OpenAiSpeechGenerator};
pub use replicate::{
    Prediction, PredictionStatus, ReplicateClient, ReplicateStoryboardGenerator,
    ReplicateVideoGenerator,
};
pub use retry::RetryPolicy;
