//! Prediction lifecycle: create, poll, download.

use super::PROVIDER;
use super::dto::{CreatePrediction, Prediction, PredictionStatus};
use crate::http::{decode_error, download_to, send};
use crate::retry::RetryPolicy;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use storyreel_config::StoryreelConfig;
use storyreel_error::{ProviderError, ProviderErrorKind, StoryreelResult};
use tracing::{debug, info, instrument};

/// Thin client over the Replicate HTTP API.
///
/// Model references take two forms: `owner/name` runs the model's latest
/// version through `/models/{owner}/{name}/predictions`, while
/// `owner/name:version` pins a version through `/predictions`.
#[derive(Clone)]
pub struct ReplicateClient {
    http: Client,
    api_token: String,
    base_url: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ReplicateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicateClient")
            .field("base_url", &self.base_url)
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .finish_non_exhaustive()
    }
}

impl ReplicateClient {
    /// Create a client with an explicit token and endpoint.
    pub fn new(api_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_token: api_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(2000),
            max_poll_attempts: 300,
            retry: RetryPolicy::default(),
        }
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the Replicate API token is missing.
    #[instrument(skip_all)]
    pub fn from_config(config: &StoryreelConfig) -> StoryreelResult<Self> {
        let replicate = &config.providers.replicate;
        Ok(Self::new(config.require_replicate_token()?, replicate.base_url.as_str())
            .with_polling(
                Duration::from_millis(replicate.poll_interval_ms),
                replicate.max_poll_attempts,
            )
            .with_retry_policy(RetryPolicy::from_settings(&config.retry)))
    }

    /// Replace the polling cadence.
    pub fn with_polling(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = interval;
        self.max_poll_attempts = max_attempts;
        self
    }

    /// Replace the retry policy used for every request.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Start a prediction for `model` with `input`.
    #[instrument(skip(self, input))]
    pub async fn create_prediction(
        &self,
        model: &str,
        input: &serde_json::Value,
    ) -> StoryreelResult<Prediction> {
        let (url, version) = match model.split_once(':') {
            Some((_, version)) => (format!("{}/predictions", self.base_url), Some(version)),
            None => (format!("{}/models/{}/predictions", self.base_url, model), None),
        };
        let body = CreatePrediction { version, input };

        // Not idempotent: a retried create can start a second billed prediction.
        let response = send(PROVIDER, &RetryPolicy::no_retry(), || {
            self.http
                .post(&url)
                .bearer_auth(&self.api_token)
                .json(&body)
        })
        .await?;

        let prediction: Prediction = response
            .json()
            .await
            .map_err(|e| decode_error(PROVIDER, e.to_string()))?;
        debug!(id = %prediction.id(), status = prediction.status().as_str(), "Created prediction");
        Ok(prediction)
    }

    /// Fetch the current state of prediction `id`.
    pub async fn get_prediction(&self, id: &str) -> StoryreelResult<Prediction> {
        let url = format!("{}/predictions/{}", self.base_url, id);
        let response = send(PROVIDER, &self.retry, || {
            self.http.get(&url).bearer_auth(&self.api_token)
        })
        .await?;

        response
            .json()
            .await
            .map_err(|e| decode_error(PROVIDER, e.to_string()).into())
    }

    /// Poll until the prediction reaches a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderErrorKind::Prediction`] when the prediction fails,
    /// is cancelled, or is still running after the configured number of
    /// polls.
    #[instrument(skip(self, prediction), fields(id = %prediction.id()))]
    pub async fn wait(&self, mut prediction: Prediction) -> StoryreelResult<Prediction> {
        let mut attempts = 0;
        while !prediction.status().is_terminal() {
            if attempts >= self.max_poll_attempts {
                return Err(ProviderError::new(ProviderErrorKind::Prediction {
                    id: prediction.id().clone(),
                    status: prediction.status().as_str().to_string(),
                    message: format!("still running after {} status checks", attempts),
                })
                .into());
            }
            tokio::time::sleep(self.poll_interval).await;
            attempts += 1;
            prediction = self.get_prediction(prediction.id()).await?;
            debug!(attempt = attempts, status = prediction.status().as_str(), "Polled prediction");
        }

        if *prediction.status() != PredictionStatus::Succeeded {
            return Err(ProviderError::new(ProviderErrorKind::Prediction {
                id: prediction.id().clone(),
                status: prediction.status().as_str().to_string(),
                message: prediction.error_message(),
            })
            .into());
        }
        Ok(prediction)
    }

    /// Create a prediction, wait for it, and return its first output URL.
    #[instrument(skip(self, input))]
    pub async fn run(&self, model: &str, input: &serde_json::Value) -> StoryreelResult<String> {
        let prediction = self.create_prediction(model, input).await?;
        let prediction = self.wait(prediction).await?;

        let url = prediction.first_output_url().ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::Prediction {
                id: prediction.id().clone(),
                status: prediction.status().as_str().to_string(),
                message: "prediction succeeded without an output URL".to_string(),
            })
        })?;
        info!(id = %prediction.id(), "Prediction succeeded");
        Ok(url.to_string())
    }

    /// Download a prediction output to `dest`.
    pub async fn download(&self, url: &str, dest: &Path) -> StoryreelResult<()> {
        download_to(&self.http, &self.retry, url, dest).await
    }
}
