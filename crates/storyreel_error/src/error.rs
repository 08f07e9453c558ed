//! Top-level error wrapper types.

use crate::{ConfigError, ContentError, JsonError, PipelineError, ProviderError, StorageError};

/// Every error condition the workspace can raise.
///
/// # Examples
///
/// ```
/// use storyreel_error::{ConfigError, StoryreelError};
///
/// let err: StoryreelError = ConfigError::new("Replicate API token is required").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryreelErrorKind {
    /// Upstream response failed structural validation
    #[from(ContentError)]
    Content(ContentError),
    /// External provider failure
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Missing credential or setting
    #[from(ConfigError)]
    Config(ConfigError),
    /// Filesystem persistence failure
    #[from(StorageError)]
    Storage(StorageError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Orchestrator bookkeeping error
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Storyreel error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyreel Error: {}", _0)]
pub struct StoryreelError(Box<StoryreelErrorKind>);

impl StoryreelError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryreelErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryreelErrorKind {
        &self.0
    }

    /// Whether this error is a structural content failure.
    pub fn is_content(&self) -> bool {
        matches!(self.kind(), StoryreelErrorKind::Content(_))
    }

    /// Whether this error is an external provider failure.
    pub fn is_provider(&self) -> bool {
        matches!(self.kind(), StoryreelErrorKind::Provider(_))
    }
}

impl<T> From<T> for StoryreelError
where
    T: Into<StoryreelErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Storyreel operations.
pub type StoryreelResult<T> = std::result::Result<T, StoryreelError>;
