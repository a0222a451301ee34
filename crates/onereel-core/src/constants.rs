//! Shared constants

/// Number of fixed gallery positions.
pub const GALLERY_SLOTS: usize = 6;

/// Video sampling points in milliseconds, ascending.
pub const DEFAULT_FRAME_TIMESTAMPS_MS: [u64; 5] = [0, 5000, 10000, 15000, 20000];

/// Timestamp used for the video preview still.
pub const PREVIEW_TIMESTAMP_MS: u64 = 0;

pub const DEFAULT_IMAGE_PROMPT: &str = "Describe this image for AI search filtering";
pub const DEFAULT_VIDEO_FRAME_PROMPT: &str = "Summarize this frame for video search";

/// JPEG quality used when re-encoding stills (picker quality 0.8).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 200;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// MIME type sent with every still.
pub const STILL_MIME_TYPE: &str = "image/jpeg";
