//! Video frame extraction

pub mod extractor;
pub mod service;

pub use extractor::FrameExtractor;
pub use service::FFmpegService;
