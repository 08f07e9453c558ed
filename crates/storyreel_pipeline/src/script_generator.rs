//! Script stage backed by a language model.

use crate::extraction::{extract_json, parse_json};
use async_trait::async_trait;
use serde::Deserialize;
use storyreel_core::ScriptOutput;
use storyreel_error::{ContentError, ContentErrorKind, StoryreelResult};
use storyreel_interface::{CompletionRequestBuilder, ScriptGenerator, TextDriver};
use tracing::{info, instrument};

const SYSTEM_PROMPT: &str = "You are a screenwriter for short educational and cinematic videos. \
Write narration that is vivid, concrete and easy to follow when spoken aloud. \
Favour imagery that can be filmed: places, objects, light and motion.";

const DEFAULT_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Deserialize)]
struct ScriptPayload {
    title: Option<String>,
    script: Option<String>,
}

/// Generates `{title, script}` with a [`TextDriver`].
#[derive(Debug, Clone)]
pub struct LlmScriptGenerator<D> {
    driver: D,
    max_tokens: u32,
}

impl<D: TextDriver> LlmScriptGenerator<D> {
    /// Create a generator using `driver`.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Cap the completion length.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn user_prompt(prompt: &str) -> String {
        format!(
            "Create a short video script (30-60 seconds) based on this prompt: {prompt}\n\n\
             Return ONLY a JSON object with this structure:\n\
             {{\n    \"title\": \"engaging video title\",\n    \"script\": \"complete narration script that flows naturally\"\n}}\n\n\
             Make the script engaging and suitable for narration. DO NOT include any text outside the JSON."
        )
    }
}

/// Parse a model response into a script.
pub(crate) fn parse_script(response: &str) -> StoryreelResult<ScriptOutput> {
    let json = extract_json(response, "script")?;
    let payload: ScriptPayload = parse_json(&json, "script")?;

    let title = payload
        .title
        .ok_or_else(|| ContentError::new(ContentErrorKind::MissingField("title".to_string())))?;
    let script = payload
        .script
        .ok_or_else(|| ContentError::new(ContentErrorKind::MissingField("script".to_string())))?;

    let output = ScriptOutput::new(title.trim(), script.trim());
    output.validate()?;
    Ok(output)
}

#[async_trait]
impl<D: TextDriver> ScriptGenerator for LlmScriptGenerator<D> {
    #[instrument(skip(self, prompt), fields(provider = self.driver.provider_name(), model = self.driver.model_name()))]
    async fn generate(&self, prompt: &str) -> StoryreelResult<ScriptOutput> {
        let request = CompletionRequestBuilder::default()
            .system(SYSTEM_PROMPT)
            .user(Self::user_prompt(prompt))
            .max_tokens(self.max_tokens)
            .json_output(true)
            .build()
            .map_err(|e| {
                ContentError::new(ContentErrorKind::Parse {
                    what: "script request".to_string(),
                    reason: e.to_string(),
                })
            })?;

        let response = self.driver.complete(&request).await?;
        let script = parse_script(&response)?;

        info!(title = %script.title(), words = script.word_count(), "Script generated");
        Ok(script)
    }
}
