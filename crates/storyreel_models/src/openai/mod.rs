//! OpenAI chat completions and speech synthesis.

mod chat;
mod dto;
mod speech;

pub use chat::OpenAiChatDriver;
pub use speech::OpenAiSpeechGenerator;

pub(crate) const PROVIDER: &str = "openai";
