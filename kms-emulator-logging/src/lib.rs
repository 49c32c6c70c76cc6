//! Structured logging setup for the KMS emulator

use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize JSON logging
///
/// `RUST_LOG` overrides `default_level`. Every line carries target, file and
/// line number so request logs can be traced back to the handler.
pub fn init_logging(service_name: &str, default_level: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_current_span(false)
                .with_span_list(false),
        )
        .try_init()?;

    tracing::info!(service = service_name, format = "json", "Logging initialized");
    Ok(())
}

/// Initialize human-readable console logging (for development)
pub fn init_console_logging(service_name: &str, default_level: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(fmt::layer().with_target(true))
        .try_init()?;

    tracing::info!(service = service_name, format = "console", "Logging initialized");
    Ok(())
}
