//! OpenAI chat completions backend.

use super::PROVIDER;
use super::dto::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat};
use crate::http::{decode_error, send};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::Client;
use storyreel_config::StoryreelConfig;
use storyreel_error::StoryreelResult;
use storyreel_interface::{CompletionRequest, TextDriver};
use tracing::{debug, instrument};

/// [`TextDriver`] backed by `POST {base_url}/chat/completions`.
#[derive(Clone)]
pub struct OpenAiChatDriver {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for OpenAiChatDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatDriver")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiChatDriver {
    /// Create a driver with an explicit key, endpoint and model.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Create a driver from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the OpenAI API key is missing.
    #[instrument(skip_all)]
    pub fn from_config(config: &StoryreelConfig) -> StoryreelResult<Self> {
        let openai = &config.providers.openai;
        Ok(Self::new(
            config.require_openai_key()?,
            openai.base_url.as_str(),
            openai.model.as_str(),
        )
        .with_retry_policy(RetryPolicy::from_settings(&config.retry)))
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl TextDriver for OpenAiChatDriver {
    #[instrument(skip(self, request), fields(model = %self.model, json = request.json_output()))]
    async fn complete(&self, request: &CompletionRequest) -> StoryreelResult<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.user(),
        });

        let body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: *request.max_tokens(),
            temperature: *request.temperature(),
            response_format: request
                .json_output()
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, "Sending chat completion request");

        let response = send(PROVIDER, &self.retry, || {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| decode_error(PROVIDER, e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| decode_error(PROVIDER, "response contained no message content"))?;

        debug!(chars = content.len(), "Received chat completion");
        Ok(content.trim().to_string())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
