//! Provider (external service) error types and retry classification.

/// Transport and service failures from external providers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderErrorKind {
    /// Request could not be sent or the connection failed
    #[display("{} request failed: {}", provider, message)]
    Http {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
    /// Provider answered with a non-success status
    #[display("{} returned HTTP {}: {}", provider, status_code, message)]
    Status {
        /// Provider name
        provider: String,
        /// HTTP status code
        status_code: u16,
        /// Response body or reason
        message: String,
    },
    /// Provider response body could not be decoded
    #[display("{} response could not be decoded: {}", provider, message)]
    Decode {
        /// Provider name
        provider: String,
        /// Decode failure
        message: String,
    },
    /// An asynchronous prediction ended without output
    #[display("Prediction {} ended with status '{}': {}", id, status, message)]
    Prediction {
        /// Prediction identifier
        id: String,
        /// Terminal status reported by the provider
        status: String,
        /// Provider-supplied error text
        message: String,
    },
    /// Downloading a generated artifact failed
    #[display("Failed to download {}: {}", url, message)]
    Download {
        /// Artifact URL
        url: String,
        /// Error message
        message: String,
    },
    /// An external process (e.g. ffmpeg) failed
    #[display("{} failed: {}", program, message)]
    Process {
        /// Program name
        program: String,
        /// Error message or stderr tail
        message: String,
    },
}

impl ProviderErrorKind {
    /// Check if this error should be retried by the owning stage transform.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderErrorKind::Http { .. } => true,
            ProviderErrorKind::Status { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            ProviderErrorKind::Download { .. } => true,
            _ => false,
        }
    }
}

/// Provider error with location tracking.
///
/// # Examples
///
/// ```
/// use storyreel_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new(ProviderErrorKind::Status {
///     provider: "replicate".to_string(),
///     status_code: 503,
///     message: "Service Unavailable".to_string(),
/// });
/// assert!(err.kind.is_retryable());
/// assert!(format!("{}", err).contains("HTTP 503"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The specific error condition
    pub kind: ProviderErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
