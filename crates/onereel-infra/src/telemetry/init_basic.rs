use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with an `EnvFilter`.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used
/// (e.g. `"onereel=info"`). Logs go to stderr so stdout stays free for
/// command output.
pub fn init_telemetry(default_filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    #[cfg(feature = "observability-json")]
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr);

    #[cfg(not(feature = "observability-json"))]
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::debug!("Telemetry initialized");
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_telemetry_twice_fails_second_time() {
        // The global subscriber can only be installed once per process.
        let first = init_telemetry("onereel=debug");
        let second = init_telemetry("onereel=debug");
        assert!(first.is_ok());
        assert!(second.is_err());
    }
}
