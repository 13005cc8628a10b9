//! Structured logging with JSON or pretty output.
//!
//! Logs go to stderr so that command output on stdout stays machine-readable.

use crate::{LogFormat, TelemetryConfig, TelemetryError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the logging subsystem.
///
/// Sets up tracing-subscriber with either JSON or pretty format,
/// respecting the configured log level. `RUST_LOG` takes precedence.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Json => init_json_logging(filter)?,
        LogFormat::Pretty => init_pretty_logging(filter)?,
    }

    tracing::debug!(service = %config.service_name, "logging initialized");
    Ok(())
}

/// Initialize JSON logging.
fn init_json_logging(filter: EnvFilter) -> Result<(), TelemetryError> {
    let json_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_file(false)
        .with_line_number(false)
        .flatten_event(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

/// Initialize pretty logging for interactive use.
fn init_pretty_logging(filter: EnvFilter) -> Result<(), TelemetryError> {
    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(pretty_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

/// Standard log event names.
pub mod events {
    /// A routing document has been resolved.
    pub const DOCUMENT_LOADED: &str = "document_loaded";

    /// An import has been resolved into a sub-collection.
    pub const IMPORT_RESOLVED: &str = "import_resolved";

    /// A route replaced an existing route of the same name.
    pub const ROUTE_OVERRIDDEN: &str = "route_overridden";

    /// Loading a routing document failed.
    pub const LOAD_FAILED: &str = "load_failed";
}

/// Helper macros for structured logging with standard fields.
///
/// These wrap the tracing macros to ensure consistent field naming.
#[macro_export]
macro_rules! log_document_loaded {
    ($($field:tt)*) => {
        tracing::debug!(
            event = $crate::logging::events::DOCUMENT_LOADED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_import_resolved {
    ($($field:tt)*) => {
        tracing::debug!(
            event = $crate::logging::events::IMPORT_RESOLVED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_route_overridden {
    ($($field:tt)*) => {
        tracing::warn!(
            event = $crate::logging::events::ROUTE_OVERRIDDEN,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_load_failed {
    ($($field:tt)*) => {
        tracing::error!(
            event = $crate::logging::events::LOAD_FAILED,
            $($field)*
        )
    };
}
