//! FFmpeg-backed frame extraction

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use tempfile::TempDir;
use tokio::process::Command;

use super::extractor::FrameExtractor;
use crate::error::IngestError;

const FRAME_FILE_NAME: &str = "frame.jpg";

/// Runs the system `ffmpeg` binary to grab single frames.
#[derive(Debug, Clone)]
pub struct FFmpegService {
    ffmpeg_path: String,
}

impl FFmpegService {
    pub fn new(ffmpeg_path: impl Into<String>) -> Result<Self, IngestError> {
        let ffmpeg_path = ffmpeg_path.into();
        if ffmpeg_path.trim().is_empty() {
            return Err(IngestError::FfmpegNotFound(ffmpeg_path));
        }
        Ok(Self { ffmpeg_path })
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    /// Arguments that seek to `timestamp_ms` and write exactly one frame.
    fn frame_args(video: &Path, output: &Path, timestamp_ms: u64) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-ss".to_string(),
            format_seek(timestamp_ms),
            "-i".to_string(),
            video.display().to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            "2".to_string(),
            output.display().to_string(),
        ]
    }

    /// Arguments that keep overwriting `output` with frames from the final
    /// second, leaving the last frame of the video behind.
    fn last_frame_args(video: &Path, output: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-sseof".to_string(),
            "-1".to_string(),
            "-i".to_string(),
            video.display().to_string(),
            "-update".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            "2".to_string(),
            output.display().to_string(),
        ]
    }

    async fn run(&self, args: &[String]) -> Result<(), IngestError> {
        let output = Command::new(&self.ffmpeg_path)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => IngestError::FfmpegNotFound(self.ffmpeg_path.clone()),
                _ => IngestError::FfmpegFailed(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IngestError::FfmpegFailed(stderr.trim().to_string()));
        }

        Ok(())
    }

    async fn read_frame(path: &Path) -> Option<Bytes> {
        match tokio::fs::read(path).await {
            Ok(data) if !data.is_empty() => Some(Bytes::from(data)),
            _ => None,
        }
    }
}

#[async_trait]
impl FrameExtractor for FFmpegService {
    async fn extract_frame(&self, video: &Path, timestamp_ms: u64) -> Result<Bytes, IngestError> {
        let temp_dir = TempDir::new().map_err(|e| IngestError::Read {
            path: std::env::temp_dir(),
            source: e,
        })?;
        let frame_path = temp_dir.path().join(FRAME_FILE_NAME);

        self.run(&Self::frame_args(video, &frame_path, timestamp_ms))
            .await?;
        if let Some(frame) = Self::read_frame(&frame_path).await {
            tracing::debug!(timestamp_ms, frame_size = frame.len(), "Video frame extracted");
            return Ok(frame);
        }

        // Seeking past the end yields no frame; fall back to the last one.
        tracing::debug!(
            timestamp_ms,
            video = %video.display(),
            "No frame at timestamp, using last frame of video"
        );
        self.run(&Self::last_frame_args(video, &frame_path)).await?;
        Self::read_frame(&frame_path).await.ok_or_else(|| {
            IngestError::EmptyFrame(format!(
                "{} has no decodable video frames",
                video.display()
            ))
        })
    }
}

/// Format milliseconds as an ffmpeg seek position in seconds.
fn format_seek(timestamp_ms: u64) -> String {
    format!("{}.{:03}", timestamp_ms / 1000, timestamp_ms % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_seek() {
        assert_eq!(format_seek(0), "0.000");
        assert_eq!(format_seek(5000), "5.000");
        assert_eq!(format_seek(15250), "15.250");
    }

    #[test]
    fn test_frame_args_seek_before_input() {
        let args = FFmpegService::frame_args(
            &PathBuf::from("/videos/clip.mp4"),
            &PathBuf::from("/tmp/out.jpg"),
            10000,
        );
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input);
        assert_eq!(args[ss + 1], "10.000");
        assert_eq!(args[input + 1], "/videos/clip.mp4");
        assert_eq!(args.last().unwrap(), "/tmp/out.jpg");
        assert!(args.windows(2).any(|w| w[0] == "-frames:v" && w[1] == "1"));
    }

    #[test]
    fn test_last_frame_args() {
        let args = FFmpegService::last_frame_args(
            &PathBuf::from("clip.mp4"),
            &PathBuf::from("out.jpg"),
        );
        assert!(args.windows(2).any(|w| w[0] == "-sseof" && w[1] == "-1"));
        assert!(args.windows(2).any(|w| w[0] == "-update" && w[1] == "1"));
    }

    #[test]
    fn test_new_rejects_empty_path() {
        assert!(matches!(
            FFmpegService::new("  "),
            Err(IngestError::FfmpegNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_reports_not_found() {
        let service = FFmpegService::new("/nonexistent/bin/ffmpeg-onereel").unwrap();
        let result = service
            .extract_frame(Path::new("/nonexistent/clip.mp4"), 0)
            .await;
        assert!(matches!(result, Err(IngestError::FfmpegNotFound(_))));
    }
}
