//! Error types for the Storyreel pipeline.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Stage transforms raise [`ContentError`] when an upstream generative
//! response fails structural validation and [`ProviderError`] for transport
//! or service failures. [`ConfigError`] is raised at construction time,
//! before any run begins.
//!
//! # Examples
//!
//! ```
//! use storyreel_error::{ContentError, ContentErrorKind, StoryreelResult};
//!
//! fn parse_title(raw: &str) -> StoryreelResult<String> {
//!     if raw.trim().is_empty() {
//!         Err(ContentError::new(ContentErrorKind::EmptyField("title".to_string())))?
//!     }
//!     Ok(raw.to_string())
//! }
//!
//! assert!(parse_title("").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod content;
mod error;
mod json;
mod pipeline;
mod provider;
mod storage;

pub use config::ConfigError;
pub use content::{ContentError, ContentErrorKind};
pub use error::{StoryreelError, StoryreelErrorKind, StoryreelResult};
pub use json::JsonError;
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use provider::{ProviderError, ProviderErrorKind};
pub use storage::{StorageError, StorageErrorKind};
