//! Description service providers
//!
//! The pipeline only knows the [`DescriptionService`] trait: image bytes and a
//! prompt in, free-form text out. Providers live behind feature flags.

pub mod service;

#[cfg(feature = "plugin-gemini")]
pub mod gemini;

pub use service::{fallback_text, DescriptionError, DescriptionService};

#[cfg(feature = "plugin-gemini")]
pub use gemini::GeminiVisionClient;
