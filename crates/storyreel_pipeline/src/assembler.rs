//! Final assembly through the `ffmpeg` command-line tool.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use storyreel_error::{ProviderError, ProviderErrorKind, StoryreelResult};
use storyreel_interface::VideoAssembler;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Characters of stderr kept in error messages.
const STDERR_TAIL: usize = 800;

/// Concatenates clips with ffmpeg's concat demuxer and muxes the narration.
///
/// The output is cut to the shorter of the two streams (`-shortest`), so a
/// narration longer than the clips never leaves frozen frames at the end.
#[derive(Debug, Clone)]
pub struct FfmpegAssembler {
    ffmpeg_path: PathBuf,
}

impl FfmpegAssembler {
    /// Use the ffmpeg binary at `ffmpeg_path` (a bare name is looked up on `PATH`).
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    fn program_name(&self) -> String {
        self.ffmpeg_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.ffmpeg_path.to_string_lossy().to_string())
    }

    fn process_error(&self, message: impl Into<String>) -> ProviderError {
        ProviderError::new(ProviderErrorKind::Process {
            program: self.program_name(),
            message: message.into(),
        })
    }
}

/// Render the concat demuxer list for `clips`.
///
/// The demuxer resolves relative entries against the list file's directory,
/// so every clip is written as an absolute path.
pub(crate) fn concat_list(clips: &[PathBuf]) -> std::io::Result<String> {
    let mut list = String::new();
    for clip in clips {
        let path = std::path::absolute(clip)?;
        let path = path.to_string_lossy().replace('\'', r"'\''");
        list.push_str(&format!("file '{path}'\n"));
    }
    Ok(list)
}

/// Arguments for concatenating the listed clips under `audio`.
pub(crate) fn ffmpeg_args(list: &Path, audio: &Path, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-f", "concat", "-safe", "0", "-i"]
        .into_iter()
        .map(String::from)
        .collect();
    args.push(list.to_string_lossy().to_string());
    args.push("-i".to_string());
    args.push(audio.to_string_lossy().to_string());
    args.extend(
        [
            "-map", "0:v", "-map", "1:a", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-c:a", "aac",
            "-shortest",
        ]
        .into_iter()
        .map(String::from),
    );
    args.push(output.to_string_lossy().to_string());
    args
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let skip = text.chars().count().saturating_sub(STDERR_TAIL);
    text.chars().skip(skip).collect()
}

#[async_trait]
impl VideoAssembler for FfmpegAssembler {
    #[instrument(skip(self, clips), fields(clips = clips.len(), output = %output.display()))]
    async fn assemble(
        &self,
        clips: &[PathBuf],
        audio: &Path,
        output: &Path,
    ) -> StoryreelResult<PathBuf> {
        if clips.is_empty() {
            return Err(self.process_error("no clips to assemble").into());
        }

        let list_path = output.with_extension("concat.txt");
        let list = concat_list(clips)
            .map_err(|e| self.process_error(format!("failed to resolve clip paths: {e}")))?;
        tokio::fs::write(&list_path, list)
            .await
            .map_err(|e| self.process_error(format!("failed to write concat list: {e}")))?;

        let args = ffmpeg_args(&list_path, audio, output);
        debug!(program = %self.ffmpeg_path.display(), ?args, "Running ffmpeg");

        let result = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        if let Err(e) = tokio::fs::remove_file(&list_path).await {
            warn!(path = %list_path.display(), error = %e, "Failed to remove concat list");
        }

        let out = result.map_err(|e| self.process_error(format!("failed to spawn: {e}")))?;
        if !out.status.success() {
            return Err(self.process_error(format!(
                "exited with status {}: {}",
                out.status,
                stderr_tail(&out.stderr)
            ))
            .into());
        }

        info!(output = %output.display(), "Final video assembled");
        Ok(output.to_path_buf())
    }
}
