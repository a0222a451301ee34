//! Tracing initialization
//!
//! Installs the global `tracing` subscriber. Output is human-readable by
//! default; the `observability-json` feature switches to JSON lines.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry};
