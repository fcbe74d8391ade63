//! Logging initialization and configuration
//!
//! Structured logging with `tracing`, written to stderr so generated text
//! printed on stdout (`datamatic render`) stays clean.
//!
//! Environment:
//! - `DATAMATIC_LOG`: filter directives (falls back to `RUST_LOG`, then `info`)
//! - `DATAMATIC_LOG_FORMAT`: `pretty` (default) or `json`
//! - `DATAMATIC_LOG_LOCATION`: `true` to include file:line

use anyhow::Result;
use std::env;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Log format: pretty for terminals, JSON for CI log collectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directives, e.g. `info` or `datamatic::generator=debug`
    pub filter: String,
    pub format: LogFormat,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            filter: env::var("DATAMATIC_LOG")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("DATAMATIC_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            ),
            include_location: env::var("DATAMATIC_LOG_LOCATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Raise the filter to `debug` (for `--verbose`)
    pub fn verbose(mut self) -> Self {
        self.filter = "debug".to_string();
        self
    }
}

/// Build the filter, falling back to `info` for unparsable directives.
fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_new(&config.filter).unwrap_or_else(|e| {
        eprintln!("Warning: Invalid log filter '{}': {e}", config.filter);
        EnvFilter::new("info")
    })
}

/// Initialize the global subscriber.
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}
