//! Stage names and the outputs each stage produces.

use crate::{ScenePlan, ScriptOutput};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The six ordered pipeline stages.
///
/// # Examples
///
/// ```
/// use storyreel_core::StageName;
/// use strum::IntoEnumIterator;
///
/// let steps: Vec<u8> = StageName::iter().map(|s| s.step()).collect();
/// assert_eq!(steps, vec![1, 2, 3, 4, 5, 6]);
/// assert_eq!(StageName::FinalVideo.as_str(), "final_video");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    /// Narration script generation
    #[display("script")]
    Script,
    /// Scene planning
    #[display("scenes")]
    Scenes,
    /// Optional storyboard image generation
    #[display("storyboard")]
    Storyboard,
    /// Video clip generation
    #[display("clips")]
    Clips,
    /// Voiceover synthesis
    #[display("audio")]
    Audio,
    /// Final assembly
    #[display("final_video")]
    FinalVideo,
}

impl StageName {
    /// Stable key used in the run state and the metadata record.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Script => "script",
            StageName::Scenes => "scenes",
            StageName::Storyboard => "storyboard",
            StageName::Clips => "clips",
            StageName::Audio => "audio",
            StageName::FinalVideo => "final_video",
        }
    }

    /// One-based step index of this stage.
    pub fn step(&self) -> u8 {
        match self {
            StageName::Script => 1,
            StageName::Scenes => 2,
            StageName::Storyboard => 3,
            StageName::Clips => 4,
            StageName::Audio => 5,
            StageName::FinalVideo => 6,
        }
    }

    /// Human-readable stage title.
    pub fn title(&self) -> &'static str {
        match self {
            StageName::Script => "Script Generation",
            StageName::Scenes => "Scene Planning",
            StageName::Storyboard => "Storyboard Generation",
            StageName::Clips => "Video Clip Generation",
            StageName::Audio => "Voiceover Generation",
            StageName::FinalVideo => "Final Assembly",
        }
    }

    pub(crate) fn starting_label(&self) -> &'static str {
        match self {
            StageName::Script => "Generating script...",
            StageName::Scenes => "Planning scenes...",
            StageName::Storyboard => "Generating storyboards...",
            StageName::Clips => "Generating video clips...",
            StageName::Audio => "Generating voiceover...",
            StageName::FinalVideo => "Assembling final video...",
        }
    }

    pub(crate) fn completed_label(&self) -> &'static str {
        match self {
            StageName::Script => "Script generated",
            StageName::Scenes => "Scenes planned",
            StageName::Storyboard => "Storyboards generated",
            StageName::Clips => "Video clips generated",
            StageName::Audio => "Voiceover generated",
            StageName::FinalVideo => "Video complete!",
        }
    }
}

/// Output of one completed stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StageOutput {
    /// Title and narration
    Script(ScriptOutput),
    /// Ordered scenes
    Scenes(ScenePlan),
    /// One image reference per scene
    Storyboard(Vec<String>),
    /// One clip file per scene
    Clips(Vec<PathBuf>),
    /// Narration track
    Audio(PathBuf),
    /// Assembled video
    FinalVideo(PathBuf),
}

impl StageOutput {
    /// The stage this output belongs to.
    pub fn stage(&self) -> StageName {
        match self {
            StageOutput::Script(_) => StageName::Script,
            StageOutput::Scenes(_) => StageName::Scenes,
            StageOutput::Storyboard(_) => StageName::Storyboard,
            StageOutput::Clips(_) => StageName::Clips,
            StageOutput::Audio(_) => StageName::Audio,
            StageOutput::FinalVideo(_) => StageName::FinalVideo,
        }
    }
}
