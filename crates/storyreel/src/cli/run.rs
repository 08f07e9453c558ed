//! Video generation command handler.

use std::sync::Arc;
use storyreel::{
    ProgressEvent, ProgressStatus, RunOptions, RunResult, StoryreelConfig, StoryreelResult,
    build_pipeline, ensure_directories,
};

/// Arguments of the `run` command.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub prompt: String,
    pub output: Option<String>,
    pub scenes: Option<u32>,
    pub duration: Option<f64>,
    pub no_storyboard: bool,
    pub json: bool,
}

fn print_progress(event: &ProgressEvent) {
    let marker = match event.status() {
        ProgressStatus::Starting => "..",
        ProgressStatus::Completed => "ok",
        ProgressStatus::Skipped => "--",
    };
    eprintln!(
        "[{}/{}] {} {} - {}",
        event.step(),
        event.total_steps(),
        marker,
        event.label(),
        event.detail()
    );
}

/// Run the pipeline once and print the outcome.
///
/// Returns the run result so the caller can pick the exit code.
pub async fn run_video(mut config: StoryreelConfig, args: RunArgs) -> StoryreelResult<RunResult> {
    if args.no_storyboard {
        config.pipeline.use_storyboard = false;
    }

    ensure_directories(&config.output_directories())?;
    let pipeline = build_pipeline(&config)?;

    let mut options = RunOptions::builder();
    options.reporter(Arc::new(print_progress));
    if let Some(output) = args.output {
        options.output_filename(output);
    }
    if let Some(scenes) = args.scenes {
        options.scene_count(scenes);
    }
    if let Some(duration) = args.duration {
        options.scene_duration(duration);
    }
    let options = options.build().unwrap_or_default();

    let result = pipeline.run(&args.prompt, options).await;

    if args.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialize run result"),
        }
    } else if let Some(path) = result.video_path() {
        println!("Video saved to {}", path.display());
    } else if let Some(error) = result.error() {
        eprintln!("Video generation failed: {error}");
    }

    Ok(result)
}
