//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the storyreel binary.

mod commands;
mod run;
mod show;

pub use commands::{Cli, Commands};
pub use run::{RunArgs, run_video};
pub use show::show_run;

use std::path::Path;
use storyreel::{StoryreelConfig, StoryreelResult};

/// Resolve configuration and fill credentials from the environment.
pub fn load_config(path: Option<&Path>) -> StoryreelResult<StoryreelConfig> {
    let mut config = match path {
        Some(path) => StoryreelConfig::from_file(path)?,
        None => StoryreelConfig::load()?,
    };
    config.apply_credential_fallbacks(|name| std::env::var(name).ok());
    Ok(config)
}
