use std::path::PathBuf;
use std::process::{Command, Stdio};

use tokio::task;
use tracing::debug;

use crate::error::{Result, VideoError};

/// Locations of the `ffmpeg` and `ffprobe` executables
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for FfmpegTools {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FfmpegTools {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(ffmpeg: P, ffprobe: Q) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Both executables answer `-version`
    pub fn check_available(&self) -> Result<()> {
        for tool in [&self.ffmpeg, &self.ffprobe] {
            let ok = Command::new(tool)
                .arg("-version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|status| status.success())
                .unwrap_or(false);

            if !ok {
                return Err(VideoError::ToolUnavailable {
                    tool: tool.display().to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Run ffmpeg to completion, discarding stdout
    pub async fn run_ffmpeg(&self, args: Vec<String>) -> Result<()> {
        run_tool(self.ffmpeg.clone(), args).await.map(|_| ())
    }

    /// Run ffprobe to completion and return its stdout
    pub async fn run_ffprobe(&self, args: Vec<String>) -> Result<Vec<u8>> {
        run_tool(self.ffprobe.clone(), args).await
    }
}

async fn run_tool(program: PathBuf, args: Vec<String>) -> Result<Vec<u8>> {
    let tool = program.display().to_string();
    debug!("$ {} {}", tool, args.join(" "));

    let mut cmd = Command::new(&program);
    cmd.args(&args).stdin(Stdio::null());

    let output = task::spawn_blocking(move || cmd.output())
        .await
        .map_err(|e| VideoError::SpawnFailed {
            tool: tool.clone(),
            reason: format!("process task did not complete: {}", e),
        })?
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VideoError::ToolUnavailable { tool: tool.clone() },
            _ => VideoError::SpawnFailed {
                tool: tool.clone(),
                reason: e.to_string(),
            },
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VideoError::ToolFailed {
            tool,
            status: output.status.code().unwrap_or(-1),
            stderr: last_lines(&stderr, 12),
        }
        .into());
    }

    Ok(output.stdout)
}

/// Keep the tail of a long diagnostic, which is where ffmpeg puts the cause
fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriptychError;

    #[test]
    fn test_last_lines_keeps_tail() {
        let text = "a\nb\nc\nd\n";
        assert_eq!(last_lines(text, 2), "c\nd");
        assert_eq!(last_lines(text, 10), "a\nb\nc\nd");
    }

    #[test]
    fn test_missing_tool_is_unavailable() {
        let tools = FfmpegTools::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
        let err = tools.check_available().unwrap_err();
        assert!(matches!(
            err,
            TriptychError::Video(VideoError::ToolUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_missing_tool_reports_unavailable() {
        let tools = FfmpegTools::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
        let err = tools.run_ffmpeg(vec!["-version".to_string()]).await.unwrap_err();
        assert!(matches!(
            err,
            TriptychError::Video(VideoError::ToolUnavailable { .. })
        ));
    }
}
