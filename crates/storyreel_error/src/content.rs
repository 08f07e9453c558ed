//! Content validation error types.

/// Structural problems with a generative response or a stage output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ContentErrorKind {
    /// The user prompt was empty or whitespace only
    #[display("Prompt cannot be empty")]
    EmptyPrompt,
    /// A per-run option is out of range
    #[display("Invalid run option {}: {}", name, reason)]
    InvalidOption {
        /// Option name
        name: String,
        /// Why the value was rejected
        reason: String,
    },
    /// A required field is missing from a structured payload
    #[display("Missing required field: {}", _0)]
    MissingField(String),
    /// A required field is present but empty
    #[display("Field '{}' cannot be empty", _0)]
    EmptyField(String),
    /// A response could not be parsed into the expected structure
    #[display("Failed to parse {} response: {}", what, reason)]
    Parse {
        /// What was being parsed (e.g. "script", "scene plan")
        what: String,
        /// Parser failure reason
        reason: String,
    },
    /// A scene plan violates numbering or duration rules
    #[display("Invalid scene plan: {}", _0)]
    InvalidScenePlan(String),
    /// A per-scene output does not line up with the scene plan
    #[display("{} produced {} items for {} scenes", stage, actual, expected)]
    LengthMismatch {
        /// Stage that produced the sequence
        stage: String,
        /// Number of scenes in the plan
        expected: usize,
        /// Number of items produced
        actual: usize,
    },
}

/// Content error with location tracking.
///
/// # Examples
///
/// ```
/// use storyreel_error::{ContentError, ContentErrorKind};
///
/// let err = ContentError::new(ContentErrorKind::Parse {
///     what: "script".to_string(),
///     reason: "expected value at line 1 column 1".to_string(),
/// });
/// assert!(format!("{}", err).contains("Failed to parse script response"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Content Error: {} at line {} in {}", kind, line, file)]
pub struct ContentError {
    /// The specific error condition
    pub kind: ContentErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ContentError {
    /// Create a new ContentError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ContentErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
