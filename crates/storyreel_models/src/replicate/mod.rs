//! Replicate prediction API: storyboard images and video clips.

mod client;
mod dto;
mod storyboard;
mod video;

pub use client::ReplicateClient;
pub use dto::{Prediction, PredictionStatus};
pub use storyboard::ReplicateStoryboardGenerator;
pub use video::ReplicateVideoGenerator;

pub(crate) const PROVIDER: &str = "replicate";
