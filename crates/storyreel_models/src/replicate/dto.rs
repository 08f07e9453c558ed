//! Replicate wire types.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    /// Queued, model booting
    Starting,
    /// Running
    Processing,
    /// Finished with output
    Succeeded,
    /// Finished with an error
    Failed,
    /// Cancelled before finishing
    Canceled,
}

impl PredictionStatus {
    /// Whether the prediction will not change any more.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded | PredictionStatus::Failed | PredictionStatus::Canceled
        )
    }

    /// Status as reported by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Starting => "starting",
            PredictionStatus::Processing => "processing",
            PredictionStatus::Succeeded => "succeeded",
            PredictionStatus::Failed => "failed",
            PredictionStatus::Canceled => "canceled",
        }
    }
}

/// A prediction as returned by create and get calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Prediction {
    /// Prediction identifier
    id: String,
    /// Current status
    status: PredictionStatus,
    /// Model output: a URL, a list of URLs, or null while running
    #[serde(default)]
    output: Option<serde_json::Value>,
    /// Error text for failed predictions
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl Prediction {
    /// First output URL, whether the model returns a single URL or a list.
    pub fn first_output_url(&self) -> Option<&str> {
        match self.output.as_ref()? {
            serde_json::Value::String(url) => Some(url),
            serde_json::Value::Array(items) => items.iter().find_map(|item| item.as_str()),
            _ => None,
        }
    }

    /// Error text, if any.
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => "no error message".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePrediction<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'a str>,
    pub input: &'a serde_json::Value,
}
