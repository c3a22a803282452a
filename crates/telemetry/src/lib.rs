//! Logging and tracing bootstrap for LIBRIS binaries.

use tracing_subscriber::EnvFilter;

use libris_kernel::settings::{LogFormat, TelemetrySettings};

/// Initialize the tracing pipeline from telemetry settings.
///
/// The filter falls back to `RUST_LOG`, then to `info`. Safe to call more
/// than once; later calls are ignored.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = match &settings.log_filter {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match settings.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber was already initialized");
    }
    Ok(())
}
