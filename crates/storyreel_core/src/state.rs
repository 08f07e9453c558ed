//! Accumulating record of a pipeline run.

use crate::{RunId, ScenePlan, ScriptOutput, StageName, StageOutput};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use storyreel_error::{PipelineError, PipelineErrorKind, StoryreelResult};

/// Append-only map from stage name to stage output.
///
/// Iteration and serialization follow insertion order, which is execution
/// order. An entry cannot be replaced once written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stages {
    entries: Vec<StageOutput>,
}

impl Stages {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage output.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage has already been recorded.
    pub fn insert(&mut self, output: StageOutput) -> StoryreelResult<()> {
        let stage = output.stage();
        if self.contains(stage) {
            return Err(PipelineError::new(PipelineErrorKind::DuplicateStage(
                stage.as_str().to_string(),
            ))
            .into());
        }
        self.entries.push(output);
        Ok(())
    }

    /// Output recorded for `stage`, if any.
    pub fn get(&self, stage: StageName) -> Option<&StageOutput> {
        self.entries.iter().find(|output| output.stage() == stage)
    }

    /// Whether `stage` has been recorded.
    pub fn contains(&self, stage: StageName) -> bool {
        self.get(stage).is_some()
    }

    /// Recorded stage names in execution order.
    pub fn names(&self) -> Vec<StageName> {
        self.entries.iter().map(StageOutput::stage).collect()
    }

    /// Recorded outputs in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &StageOutput> {
        self.entries.iter()
    }

    /// Number of recorded stages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no stage has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Stages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for output in &self.entries {
            map.serialize_entry(output.stage().as_str(), output)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Stages {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StagesVisitor;

        impl<'de> Visitor<'de> for StagesVisitor {
            type Value = Stages;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map from stage name to stage output")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Stages, A::Error> {
                let mut stages = Stages::new();
                while let Some(stage) = map.next_key::<StageName>()? {
                    let output = match stage {
                        StageName::Script => StageOutput::Script(map.next_value()?),
                        StageName::Scenes => StageOutput::Scenes(map.next_value()?),
                        StageName::Storyboard => StageOutput::Storyboard(map.next_value()?),
                        StageName::Clips => StageOutput::Clips(map.next_value()?),
                        StageName::Audio => StageOutput::Audio(map.next_value()?),
                        StageName::FinalVideo => StageOutput::FinalVideo(map.next_value()?),
                    };
                    stages
                        .insert(output)
                        .map_err(<A::Error as de::Error>::custom)?;
                }
                Ok(stages)
            }
        }

        deserializer.deserialize_map(StagesVisitor)
    }
}

/// In-memory record of one run: prompt, identifier and every completed
/// stage output.
///
/// # Examples
///
/// ```
/// use storyreel_core::{RunId, RunState, ScriptOutput, StageName, StageOutput};
///
/// let mut state = RunState::new("Explain how rainbows form", RunId::new("20261019_120000"));
/// state
///     .record(StageOutput::Script(ScriptOutput::new("How Rainbows Form", "Light bends...")))
///     .unwrap();
///
/// assert_eq!(state.stages().names(), vec![StageName::Script]);
/// assert_eq!(state.script().unwrap().title(), "How Rainbows Form");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct RunState {
    /// User-supplied request text
    prompt: String,
    /// Run identifier
    run_id: RunId,
    /// Completed stage outputs in execution order
    stages: Stages,
}

impl RunState {
    /// Create the state for a run that is about to start.
    pub fn new(prompt: impl Into<String>, run_id: RunId) -> Self {
        Self {
            prompt: prompt.into(),
            run_id,
            stages: Stages::new(),
        }
    }

    /// Record the output of a stage that has just completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage was already recorded.
    pub fn record(&mut self, output: StageOutput) -> StoryreelResult<()> {
        tracing::debug!(run_id = %self.run_id, stage = %output.stage(), "Recording stage output");
        self.stages.insert(output)
    }

    /// Recorded script, if the script stage completed.
    pub fn script(&self) -> Option<&ScriptOutput> {
        match self.stages.get(StageName::Script) {
            Some(StageOutput::Script(script)) => Some(script),
            _ => None,
        }
    }

    /// Recorded scene plan, if the scene stage completed.
    pub fn scene_plan(&self) -> Option<&ScenePlan> {
        match self.stages.get(StageName::Scenes) {
            Some(StageOutput::Scenes(plan)) => Some(plan),
            _ => None,
        }
    }

    /// Recorded storyboard images, if the storyboard stage ran.
    pub fn storyboard(&self) -> Option<&[String]> {
        match self.stages.get(StageName::Storyboard) {
            Some(StageOutput::Storyboard(images)) => Some(images),
            _ => None,
        }
    }

    /// Recorded clip paths, if the clip stage completed.
    pub fn clips(&self) -> Option<&[PathBuf]> {
        match self.stages.get(StageName::Clips) {
            Some(StageOutput::Clips(clips)) => Some(clips),
            _ => None,
        }
    }

    /// Recorded narration track, if the audio stage completed.
    pub fn audio(&self) -> Option<&Path> {
        match self.stages.get(StageName::Audio) {
            Some(StageOutput::Audio(path)) => Some(path),
            _ => None,
        }
    }

    /// Recorded final video, if assembly completed.
    pub fn final_video(&self) -> Option<&Path> {
        match self.stages.get(StageName::FinalVideo) {
            Some(StageOutput::FinalVideo(path)) => Some(path),
            _ => None,
        }
    }
}
