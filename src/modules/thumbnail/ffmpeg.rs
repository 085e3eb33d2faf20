//! ffmpeg-backed frame extraction.
//!
//! Every call stages the video inside its own temporary directory under the
//! configured work root; the directory is removed before the call returns,
//! whatever the outcome.

use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::modules::thumbnail::extractor::{ExtractError, FrameExtractor};

const INPUT_FILE: &str = "input";
const OUTPUT_FILE: &str = "thumbnail.jpg";
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    ffmpeg_path: String,
    work_root: PathBuf,
    quality: u8,
}

impl FfmpegExtractor {
    pub fn new(ffmpeg_path: impl Into<String>, work_root: impl Into<PathBuf>, quality: u8) -> Self {
        Self { ffmpeg_path: ffmpeg_path.into(), work_root: work_root.into(), quality }
    }

    async fn run_in(
        &self,
        work_dir: &Path,
        video: &[u8],
        offset: Duration,
    ) -> Result<Bytes, ExtractError> {
        let input_path = work_dir.join(INPUT_FILE);
        let output_path = work_dir.join(OUTPUT_FILE);

        tokio::fs::write(&input_path, video).await?;

        let args = build_arguments(&input_path, &output_path, offset, self.quality);
        tracing::debug!(ffmpeg = %self.ffmpeg_path, ?args, "Running frame extraction");

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ExtractError::Spawn { tool: self.ffmpeg_path.clone(), source })?;

        if !output.status.success() {
            return Err(ExtractError::ToolFailed {
                tool: self.ffmpeg_path.clone(),
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        match tokio::fs::read(&output_path).await {
            Ok(frame) if !frame.is_empty() => Ok(Bytes::from(frame)),
            Ok(_) => Err(ExtractError::MissingOutput { tool: self.ffmpeg_path.clone() }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ExtractError::MissingOutput { tool: self.ffmpeg_path.clone() })
            }
            Err(e) => Err(ExtractError::Io(e)),
        }
    }
}

#[async_trait::async_trait]
impl FrameExtractor for FfmpegExtractor {
    #[tracing::instrument(skip(self, video), fields(video_size = video.len()))]
    async fn extract_frame(&self, video: &[u8], offset: Duration) -> Result<Bytes, ExtractError> {
        tokio::fs::create_dir_all(&self.work_root).await?;
        let work_dir = tempfile::Builder::new().prefix("thumbnail-").tempdir_in(&self.work_root)?;

        let result = self.run_in(work_dir.path(), video, offset).await;

        let dir_path = work_dir.path().to_path_buf();
        if let Err(e) = work_dir.close() {
            tracing::warn!(
                path = %dir_path.display(),
                error = %e,
                "Failed to remove working directory"
            );
        }

        match &result {
            Ok(frame) => tracing::info!(frame_size = frame.len(), "Frame extracted"),
            Err(e) => tracing::warn!(error = %e, "Frame extraction failed"),
        }

        result
    }
}

/// `-i <input> -ss <offset> -vframes 1 -q:v <quality> <output>`
pub fn build_arguments(input: &Path, output: &Path, offset: Duration, quality: u8) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-ss".to_string(),
        format_offset(offset),
        "-vframes".to_string(),
        "1".to_string(),
        "-q:v".to_string(),
        quality.to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// `HH:MM:SS.mmm`
pub fn format_offset(offset: Duration) -> String {
    let total = offset.as_secs();
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        total / 3600,
        (total % 3600) / 60,
        total % 60,
        offset.subsec_millis()
    )
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
