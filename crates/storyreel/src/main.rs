//! Storyreel CLI binary.
//!
//! - Generate a narrated video from a prompt
//! - Inspect the saved record of a previous run

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, RunArgs, load_config, run_video, show_run};

    // Credentials may live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            prompt,
            output,
            scenes,
            duration,
            no_storyboard,
            json,
        } => {
            let args = RunArgs {
                prompt,
                output,
                scenes,
                duration,
                no_storyboard,
                json,
            };
            let result = run_video(config, args).await?;
            if !*result.success() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Show { run_id } => {
            show_run(&config, &run_id).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
