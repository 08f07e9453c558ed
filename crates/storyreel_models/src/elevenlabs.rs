//! ElevenLabs text-to-speech.

use crate::artifacts::{artifact_path, batch_stamp, write_artifact};
use crate::http::send_for_bytes;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::path::PathBuf;
use storyreel_config::StoryreelConfig;
use storyreel_core::ScriptOutput;
use storyreel_error::StoryreelResult;
use storyreel_interface::AudioGenerator;
use tracing::{info, instrument};

const PROVIDER: &str = "elevenlabs";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// Narration through `POST {base_url}/text-to-speech/{voice_id}`, saved as MP3.
#[derive(Clone)]
pub struct ElevenLabsSpeechGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    voice_id: String,
    model_id: String,
    audio_dir: PathBuf,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ElevenLabsSpeechGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsSpeechGenerator")
            .field("voice_id", &self.voice_id)
            .field("model_id", &self.model_id)
            .field("audio_dir", &self.audio_dir)
            .finish_non_exhaustive()
    }
}

impl ElevenLabsSpeechGenerator {
    /// Create a generator from configuration; audio lands in `{output}/audio`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the ElevenLabs API key is missing.
    pub fn from_config(config: &StoryreelConfig) -> StoryreelResult<Self> {
        let elevenlabs = &config.providers.elevenlabs;
        Ok(Self {
            client: Client::new(),
            api_key: config.require_elevenlabs_key()?.to_string(),
            base_url: elevenlabs.base_url.trim_end_matches('/').to_string(),
            voice_id: elevenlabs.voice_id.clone(),
            model_id: elevenlabs.model_id.clone(),
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
impl AudioGenerator for ElevenLabsSpeechGenerator {
    #[instrument(skip(self, script), fields(voice_id = %self.voice_id, words = script.word_count()))]
    async fn generate(&self, script: &ScriptOutput) -> StoryreelResult<PathBuf> {
        let body = SpeechRequest {
            text: script.script(),
            model_id: &self.model_id,
        };
        let url = format!("{}/text-to-speech/{}", self.base_url, self.voice_id);

        let bytes = send_for_bytes(PROVIDER, &self.retry, || {
            self.client
                .post(&url)
                .header("xi-api-key", &self.api_key)
                .header(reqwest::header::ACCEPT, "audio/mpeg")
                .json(&body)
        })
        .await?;

        let path = artifact_path(&self.audio_dir, "narration", &batch_stamp(), "mp3");
        write_artifact(&path, &bytes).await?;

        info!(path = %path.display(), size = bytes.len(), "Saved narration");
        Ok(path)
    }
}
