//! Configuration module
//!
//! This module provides configuration structures for the description service,
//! media ingestion and the pipeline. Values come from the environment (with an
//! optional `.env` file) and fall back to the defaults in [`crate::constants`].

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_FRAME_TIMESTAMPS_MS, DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL,
    DEFAULT_IMAGE_PROMPT, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_FILE_SIZE_MB,
    DEFAULT_VIDEO_FRAME_PROMPT,
};

const DEFAULT_IMAGE_EXTENSIONS: &str = "jpg,jpeg,png,gif,webp,bmp";
const DEFAULT_VIDEO_EXTENSIONS: &str = "mp4,mov,avi,webm,mkv,m4v";

/// Description service (Gemini) configuration
///
/// WARNING: `api_key` is a secret. The `Debug` impl redacts it; never log it
/// through any other path.
#[derive(Clone)]
pub struct DescriptionServiceConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    /// Request timeout; `None` leaves calls bounded only by the service.
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for DescriptionServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptionServiceConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Media ingestion configuration
#[derive(Clone, Debug)]
pub struct IngestionConfig {
    pub ffmpeg_path: String,
    /// Video sampling points, ascending.
    pub frame_timestamps_ms: Vec<u64>,
    pub jpeg_quality: u8,
    pub max_file_size_bytes: usize,
    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            frame_timestamps_ms: DEFAULT_FRAME_TIMESTAMPS_MS.to_vec(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
            image_extensions: parse_list(DEFAULT_IMAGE_EXTENSIONS),
            video_extensions: parse_list(DEFAULT_VIDEO_EXTENSIONS),
        }
    }
}

/// How a scatter-gather treats individual failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatherPolicy {
    /// Any failure fails the whole gather.
    #[default]
    FailFast,
    /// Failures are skipped; the gather fails only if everything failed.
    BestEffort,
}

impl FromStr for GatherPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(GatherPolicy::FailFast),
            "best_effort" => Ok(GatherPolicy::BestEffort),
            other => Err(anyhow::anyhow!(
                "GATHER_POLICY must be 'fail_fast' or 'best_effort', got '{}'",
                other
            )),
        }
    }
}

/// Pipeline configuration (prompts and aggregation policy)
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub image_prompt: String,
    pub video_frame_prompt: String,
    pub gather_policy: GatherPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            image_prompt: DEFAULT_IMAGE_PROMPT.to_string(),
            video_frame_prompt: DEFAULT_VIDEO_FRAME_PROMPT.to_string(),
            gather_policy: GatherPolicy::FailFast,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub description: DescriptionServiceConfig,
    pub ingestion: IngestionConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let description = DescriptionServiceConfig {
            api_key: env::var("GEMINI_API_KEY")
                .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY must be set"))?,
            api_base: env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            timeout_secs: env::var("DESCRIPTION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0),
        };

        let ingestion = IngestionConfig {
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            frame_timestamps_ms: match env::var("FRAME_TIMESTAMPS_MS") {
                Ok(raw) => parse_timestamps(&raw)?,
                Err(_) => DEFAULT_FRAME_TIMESTAMPS_MS.to_vec(),
            },
            jpeg_quality: env::var("JPEG_QUALITY")
                .unwrap_or_else(|_| DEFAULT_JPEG_QUALITY.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("JPEG_QUALITY must be a number between 1 and 100"))?,
            max_file_size_bytes: match env::var("MAX_FILE_SIZE_MB") {
                Ok(raw) => parse_max_file_size_mb(&raw)?,
                Err(_) => DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
            },
            image_extensions: parse_list(
                &env::var("IMAGE_EXTENSIONS")
                    .unwrap_or_else(|_| DEFAULT_IMAGE_EXTENSIONS.to_string()),
            ),
            video_extensions: parse_list(
                &env::var("VIDEO_EXTENSIONS")
                    .unwrap_or_else(|_| DEFAULT_VIDEO_EXTENSIONS.to_string()),
            ),
        };

        let pipeline = PipelineConfig {
            image_prompt: env::var("IMAGE_PROMPT")
                .unwrap_or_else(|_| DEFAULT_IMAGE_PROMPT.to_string()),
            video_frame_prompt: env::var("VIDEO_FRAME_PROMPT")
                .unwrap_or_else(|_| DEFAULT_VIDEO_FRAME_PROMPT.to_string()),
            gather_policy: match env::var("GATHER_POLICY") {
                Ok(raw) => raw.parse()?,
                Err(_) => GatherPolicy::default(),
            },
        };

        let config = Config {
            description,
            ingestion,
            pipeline,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that parsing alone can't catch.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.description.api_key.trim().is_empty() {
            anyhow::bail!("GEMINI_API_KEY must not be empty");
        }
        if !self.description.api_base.starts_with("http://")
            && !self.description.api_base.starts_with("https://")
        {
            anyhow::bail!(
                "GEMINI_API_BASE must be an http(s) URL, got '{}'",
                self.description.api_base
            );
        }
        if self.description.model.trim().is_empty() {
            anyhow::bail!("GEMINI_MODEL must not be empty");
        }

        let timestamps = &self.ingestion.frame_timestamps_ms;
        if timestamps.is_empty() {
            anyhow::bail!("FRAME_TIMESTAMPS_MS must list at least one timestamp");
        }
        if timestamps.windows(2).any(|pair| pair[0] >= pair[1]) {
            anyhow::bail!("FRAME_TIMESTAMPS_MS must be strictly ascending");
        }
        if !(1..=100).contains(&self.ingestion.jpeg_quality) {
            anyhow::bail!("JPEG_QUALITY must be between 1 and 100");
        }
        if self.ingestion.max_file_size_bytes == 0 {
            anyhow::bail!("MAX_FILE_SIZE_MB must be greater than zero");
        }
        if let Some(ext) = self
            .ingestion
            .image_extensions
            .iter()
            .find(|ext| self.ingestion.video_extensions.contains(ext))
        {
            anyhow::bail!("Extension '{}' is listed as both image and video", ext);
        }

        Ok(())
    }
}

/// Parse a comma-separated list of millisecond timestamps.
pub fn parse_timestamps(raw: &str) -> Result<Vec<u64>, anyhow::Error> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| anyhow::anyhow!("Invalid timestamp '{}' in FRAME_TIMESTAMPS_MS", s))
        })
        .collect()
}

/// Parse a size limit given in megabytes into bytes.
pub fn parse_max_file_size_mb(raw: &str) -> Result<usize, anyhow::Error> {
    let raw = raw.trim();
    let megabytes = match raw.parse::<usize>() {
        Ok(mb) => mb,
        Err(_) => anyhow::bail!("MAX_FILE_SIZE_MB must be a whole number, got '{}'", raw),
    };
    match megabytes.checked_mul(1024 * 1024) {
        Some(bytes) => Ok(bytes),
        None => anyhow::bail!("MAX_FILE_SIZE_MB is too large: {}", megabytes),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            description: DescriptionServiceConfig {
                api_key: "test-key-123".to_string(),
                api_base: DEFAULT_GEMINI_API_BASE.to_string(),
                model: DEFAULT_GEMINI_MODEL.to_string(),
                timeout_secs: None,
            },
            ingestion: IngestionConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_default_timestamps() {
        let config = IngestionConfig::default();
        assert_eq!(config.frame_timestamps_ms, vec![0, 5000, 10000, 15000, 20000]);
        assert_eq!(config.jpeg_quality, 80);
    }

    #[test]
    fn test_parse_timestamps() {
        assert_eq!(parse_timestamps("0, 1000,2000,").unwrap(), vec![0, 1000, 2000]);
        assert!(parse_timestamps("0,abc").is_err());
        assert!(parse_timestamps("-5").is_err());
    }

    #[test]
    fn test_parse_max_file_size_mb() {
        assert_eq!(parse_max_file_size_mb(" 2 ").unwrap(), 2 * 1024 * 1024);
        assert!(parse_max_file_size_mb("big").is_err());
        assert!(parse_max_file_size_mb("-1").is_err());

        let err = parse_max_file_size_mb(&usize::MAX.to_string()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_parse_list_normalizes() {
        assert_eq!(parse_list(" JPG, .png ,,webp"), vec!["jpg", "png", "webp"]);
    }

    #[test]
    fn test_validate_rejects_unordered_timestamps() {
        let mut config = test_config();
        config.ingestion.frame_timestamps_ms = vec![0, 10000, 5000];
        assert!(config.validate().is_err());

        config.ingestion.frame_timestamps_ms = vec![0, 0];
        assert!(config.validate().is_err());

        config.ingestion.frame_timestamps_ms = vec![];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_quality_and_key() {
        let mut config = test_config();
        config.ingestion.jpeg_quality = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.description.api_key = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.description.api_base = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overlapping_extensions() {
        let mut config = test_config();
        config.ingestion.video_extensions.push("gif".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gif"));
    }

    #[test]
    fn test_gather_policy_from_str() {
        assert_eq!("fail_fast".parse::<GatherPolicy>().unwrap(), GatherPolicy::FailFast);
        assert_eq!("Best-Effort".parse::<GatherPolicy>().unwrap(), GatherPolicy::BestEffort);
        assert!("sometimes".parse::<GatherPolicy>().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = test_config();
        let rendered = format!("{:?}", config.description);
        assert!(!rendered.contains("test-key-123"));
        assert!(rendered.contains("<redacted>"));
    }
}
