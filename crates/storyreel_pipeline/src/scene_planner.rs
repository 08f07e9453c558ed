//! Scene planning backed by a language model.

use crate::extraction::{extract_json, parse_json};
use async_trait::async_trait;
use storyreel_core::{ScenePlan, ScriptOutput};
use storyreel_error::{ContentError, ContentErrorKind, StoryreelResult};
use storyreel_interface::{CompletionRequestBuilder, ScenePlanner, TextDriver};
use tracing::{info, instrument};

const SYSTEM_PROMPT: &str = "You are a film director breaking narration into shots. \
Each scene pairs a slice of the narration with one concrete, filmable visual. \
Describe subjects, setting, lighting and camera in plain visual language.";

const DEFAULT_SCENES: u32 = 5;
const DEFAULT_DURATION: f64 = 6.0;
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Splits a script into `{scenes: [...]}` with a [`TextDriver`].
#[derive(Debug, Clone)]
pub struct LlmScenePlanner<D> {
    driver: D,
    max_tokens: u32,
}

impl<D: TextDriver> LlmScenePlanner<D> {
    /// Create a planner using `driver`.
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

    fn user_prompt(script: &ScriptOutput, scenes: u32, duration: f64) -> String {
        format!(
            "Break this video script into exactly {scenes} scenes of about {duration} seconds each.\n\n\
             Title: {title}\n\
             Script: {body}\n\n\
             Return ONLY a JSON object with this structure:\n\
             {{\n    \"scenes\": [\n        {{\n            \"scene_number\": 1,\n            \
             \"narration\": \"the part of the script spoken during this scene\",\n            \
             \"visual_description\": \"what the camera shows\",\n            \
             \"duration\": {duration}\n        }}\n    ]\n}}\n\n\
             Number scenes from 1 in order and cover the whole script. DO NOT include any text outside the JSON.",
            title = script.title(),
            body = script.script(),
        )
    }
}

/// Parse a model response into a validated plan.
pub(crate) fn parse_plan(response: &str) -> StoryreelResult<ScenePlan> {
    let json = extract_json(response, "scene plan")?;
    let value: serde_json::Value = parse_json(&json, "scene plan")?;
    if value.get("scenes").is_none() {
        return Err(ContentError::new(ContentErrorKind::MissingField("scenes".to_string())).into());
    }

    let plan: ScenePlan = parse_json(&json, "scene plan")?;
    plan.validate()?;
    Ok(plan)
}

#[async_trait]
impl<D: TextDriver> ScenePlanner for LlmScenePlanner<D> {
    #[instrument(skip(self, script), fields(title = %script.title()))]
    async fn create_plan(
        &self,
        script: &ScriptOutput,
        target_scenes: Option<u32>,
        scene_duration: Option<f64>,
    ) -> StoryreelResult<ScenePlan> {
        let scenes = target_scenes.unwrap_or(DEFAULT_SCENES);
        let duration = scene_duration.unwrap_or(DEFAULT_DURATION);

        let request = CompletionRequestBuilder::default()
            .system(SYSTEM_PROMPT)
            .user(Self::user_prompt(script, scenes, duration))
            .max_tokens(self.max_tokens)
            .json_output(true)
            .build()
            .map_err(|e| {
                ContentError::new(ContentErrorKind::Parse {
                    what: "scene plan request".to_string(),
                    reason: e.to_string(),
                })
            })?;

        let response = self.driver.complete(&request).await?;
        let plan = parse_plan(&response)?;

        info!(
            scenes = plan.len(),
            total_duration = plan.total_duration(),
            "Scene plan created"
        );
        Ok(plan)
    }
}
