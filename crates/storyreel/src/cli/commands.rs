//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Storyreel - turn a prompt into a narrated short video
#[derive(Parser, Debug)]
#[command(name = "storyreel")]
#[command(about = "Turn a prompt into a narrated short video", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file overlaid on the bundled defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a video from a prompt
    Run {
        /// What the video should be about
        prompt: String,

        /// Final video filename inside the output directory
        #[arg(long)]
        output: Option<String>,

        /// Number of scenes to plan
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        scenes: Option<u32>,

        /// Seconds per scene
        #[arg(long)]
        duration: Option<f64>,

        /// Skip storyboard images and use text-to-video generation
        #[arg(long)]
        no_storyboard: bool,

        /// Print the run result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the saved record of a previous run
    Show {
        /// Run id, e.g. 20261019_140509
        run_id: String,
    },
}
