//! # Observability
//!
//! Logging bootstrap for Kestrel.
//!
//! Components log with plain `tracing` macros and know nothing about where the
//! lines end up. The binary calls [`init_with_config`] once at startup, which
//! installs:
//!
//! - an `EnvFilter` (`RUST_LOG` wins over the configured level)
//! - a compact, human-readable stderr layer
//! - optionally, a JSONL file layer for `tail -f relay.jsonl | jq`
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "kestrel".into(),
//!     default_level: "debug".into(),
//!     ..Default::default()
//! })?;
//! ```

mod writer;

pub use writer::LogFileWriter;

use std::io;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, written to the startup line.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by the `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional JSONL log file.
    pub log_path: Option<PathBuf>,

    /// Emit compact logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: true,
        }
    }
}

impl LogConfig {
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_level))
    }
}

/// Initialize logging with custom configuration.
///
/// Fails if the log file cannot be opened or a global subscriber is already
/// installed.
pub fn init_with_config(config: LogConfig) -> io::Result<()> {
    let file_layer = match &config.log_path {
        Some(path) => {
            let writer = LogFileWriter::open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(writer)
                    .with_filter(config.env_filter()),
            )
        }
        None => None,
    };

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(io::stderr)
            .with_filter(config.env_filter())
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(io::Error::other)?;

    tracing::debug!(
        service = %config.service_name,
        log_path = ?config.log_path,
        "observability initialized"
    );
    Ok(())
}
