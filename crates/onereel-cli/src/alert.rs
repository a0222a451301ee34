//! Error reporting at the UI boundary: log at the error's level, then show
//! the user an alert on stderr.

use std::fmt::Display;

use onereel_core::{ErrorMetadata, LogLevel};

fn log_error<E: ErrorMetadata + Display>(error: &E, slot: Option<usize>) {
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_code, slot, "Pick failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_code, slot, "Pick failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_code, slot, "Pick failed");
        }
    }
}

/// Alert text as shown to the user: `"<title>: <message>"`.
pub fn alert_text<E: ErrorMetadata>(error: &E) -> String {
    format!("{}: {}", error.alert_title(), error.client_message())
}

/// Log `error` and print its alert to stderr.
pub fn report<E: ErrorMetadata + Display>(error: &E, slot: Option<usize>) {
    log_error(error, slot);
    match slot {
        Some(slot) => eprintln!("[slot {}] {}", slot, alert_text(error)),
        None => eprintln!("{}", alert_text(error)),
    }
}
