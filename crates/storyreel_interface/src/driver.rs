//! Language-model backend used by the text stages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storyreel_error::StoryreelResult;

/// A single-turn completion request.
///
/// # Examples
///
/// ```
/// use storyreel_interface::CompletionRequestBuilder;
///
/// let request = CompletionRequestBuilder::default()
///     .system("You write short video scripts.")
///     .user("Explain how rainbows form")
///     .max_tokens(1000u32)
///     .json_output(true)
///     .build()
///     .unwrap();
/// assert!(*request.json_output());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct CompletionRequest {
    /// System instructions
    #[builder(default, setter(into, strip_option))]
    system: Option<String>,
    /// User message
    user: String,
    /// Maximum tokens to generate
    #[builder(default, setter(strip_option))]
    max_tokens: Option<u32>,
    /// Sampling temperature
    #[builder(default, setter(strip_option))]
    temperature: Option<f32>,
    /// Ask the backend for a JSON object response
    #[builder(default)]
    json_output: bool,
}

/// Core trait that every language-model backend implements.
#[async_trait]
pub trait TextDriver: Send + Sync {
    /// Generate a text completion.
    async fn complete(&self, request: &CompletionRequest) -> StoryreelResult<String>;

    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "gpt-4o").
    fn model_name(&self) -> &str;
}
