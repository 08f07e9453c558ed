//! OpenAI text-to-speech.

use super::PROVIDER;
use super::dto::SpeechRequest;
use crate::artifacts::{artifact_path, batch_stamp, write_artifact};
use crate::http::send_for_bytes;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use storyreel_config::StoryreelConfig;
use storyreel_core::ScriptOutput;
use storyreel_error::StoryreelResult;
use storyreel_interface::AudioGenerator;
use tracing::{info, instrument};

/// Narration through `POST {base_url}/audio/speech`, saved as MP3.
#[derive(Clone)]
pub struct OpenAiSpeechGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    voice: String,
    audio_dir: PathBuf,
    retry: RetryPolicy,
}

impl std::fmt::Debug for OpenAiSpeechGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSpeechGenerator")
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("audio_dir", &self.audio_dir)
            .finish_non_exhaustive()
    }
}

impl OpenAiSpeechGenerator {
    /// Create a generator from configuration; audio lands in `{output}/audio`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the OpenAI API key is missing.
    pub fn from_config(config: &StoryreelConfig) -> StoryreelResult<Self> {
        let openai = &config.providers.openai;
        Ok(Self {
            client: Client::new(),
            api_key: config.require_openai_key()?.to_string(),
            base_url: openai.base_url.trim_end_matches('/').to_string(),
            model: openai.tts_model.clone(),
            voice: openai.tts_voice.clone(),
            audio_dir: config.output.dir.join("audio"),
            retry: RetryPolicy::from_settings(&config.retry),
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl AudioGenerator for OpenAiSpeechGenerator {
    #[instrument(skip(self, script), fields(voice = %self.voice, words = script.word_count()))]
    async fn generate(&self, script: &ScriptOutput) -> StoryreelResult<PathBuf> {
        let body = SpeechRequest {
            model: &self.model,
            input: script.script(),
            voice: &self.voice,
        };
        let url = format!("{}/audio/speech", self.base_url);

        let bytes = send_for_bytes(PROVIDER, &self.retry, || {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;

        let path = artifact_path(&self.audio_dir, "narration", &batch_stamp(), "mp3");
        write_artifact(&path, &bytes).await?;

        info!(path = %path.display(), size = bytes.len(), "Saved narration");
        Ok(path)
    }
}
