//! Narration script produced by the first stage.

use serde::{Deserialize, Serialize};
use storyreel_error::{ContentError, ContentErrorKind, StoryreelResult};

/// Title and full narration text for a video.
///
/// # Examples
///
/// ```
/// use storyreel_core::ScriptOutput;
///
/// let script = ScriptOutput::new("How Rainbows Form", "Sunlight bends inside raindrops...");
/// assert!(script.validate().is_ok());
/// assert!(ScriptOutput::new("", "text").validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ScriptOutput {
    /// Video title
    title: String,
    /// Complete narration script
    script: String,
}

impl ScriptOutput {
    /// Create a script output.
    pub fn new(title: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            script: script.into(),
        }
    }

    /// Check that both title and script are non-empty.
    ///
    /// # Errors
    ///
    /// Returns a content error naming the first empty field.
    pub fn validate(&self) -> StoryreelResult<()> {
        if self.title.trim().is_empty() {
            return Err(ContentError::new(ContentErrorKind::EmptyField("title".to_string())).into());
        }
        if self.script.trim().is_empty() {
            return Err(ContentError::new(ContentErrorKind::EmptyField("script".to_string())).into());
        }
        Ok(())
    }

    /// Number of whitespace-separated words in the narration.
    pub fn word_count(&self) -> usize {
        self.script.split_whitespace().count()
    }
}
