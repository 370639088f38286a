//! Tracing subscriber bootstrap.

use anyhow::{anyhow, Context};
use shelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `telemetry.filter`.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = build_filter(&settings.filter)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::debug!(
        target: "shelf-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

fn build_filter(fallback: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(fallback)
            .with_context(|| format!("invalid log filter '{fallback}'")),
    }
}
