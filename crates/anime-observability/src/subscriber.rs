//! Subscriber setup for binaries.

use tracing_subscriber::EnvFilter;

use crate::logging::{LogFormat, LogLevel};

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Calling this more than once is
/// harmless; later calls are ignored.
pub fn init_tracing(format: LogFormat, level: LogLevel) {
    let default_directive = match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Human => builder.try_init(),
    };
}
