//! Unified logging system
//!
//! Structured `tracing` output with a configurable format and destination

use crate::error::{ErrorContext, RemitError, RemitResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Whether to include thread information
    pub include_thread: bool,
    /// Whether to log to file instead of stderr
    pub log_to_file: bool,
    /// Log file path (if log_to_file is true)
    pub log_file_path: Option<String>,
    /// Custom filter directives
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            include_thread: false,
            log_to_file: false,
            log_file_path: None,
            filter_directives: vec![
                "remit_core=debug".to_string(),
                "remit_session=debug".to_string(),
                "remit_client=debug".to_string(),
            ],
        }
    }
}

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. A second call fails instead of panicking.
pub fn init_logging(config: &LoggingConfig) -> RemitResult<()> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    for directive in &config.filter_directives {
        let parsed = directive.parse::<Directive>().map_err(|e| RemitError::Config {
            message: format!("Invalid log filter directive '{}': {}", directive, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("logging").with_operation("parse_directive"),
        })?;
        filter = filter.add_directive(parsed);
    }

    let writer = make_writer(config)?;
    let layer = fmt::layer()
        .with_writer(writer)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_ids(config.include_thread)
        .with_thread_names(config.include_thread);

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
    };

    result.map_err(|e| RemitError::Config {
        message: format!("Failed to install log subscriber: {}", e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("logging").with_operation("init"),
    })
}

fn make_writer(config: &LoggingConfig) -> RemitResult<BoxMakeWriter> {
    if !config.log_to_file {
        return Ok(BoxMakeWriter::new(std::io::stderr));
    }

    let path = config.log_file_path.as_deref().ok_or_else(|| RemitError::Config {
        message: "log_file_path must be specified when log_to_file is true".to_string(),
        source: None,
        context: ErrorContext::new("logging").with_operation("open_log_file"),
    })?;

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| RemitError::Config {
            message: format!("Failed to open log file {}: {}", path, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("logging")
                .with_operation("open_log_file")
                .with_suggestion("Check that the log directory exists and is writable"),
        })?;

    Ok(BoxMakeWriter::new(Arc::new(file)))
}

/// Logging macros for command boundaries
#[macro_export]
macro_rules! log_operation_start {
    ($operation:expr) => {
        tracing::info!(
            operation = $operation,
            "Starting operation"
        );
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info!(
            operation = $operation,
            $($field)*,
            "Starting operation"
        );
    };
}

#[macro_export]
macro_rules! log_operation_success {
    ($operation:expr) => {
        tracing::info!(
            operation = $operation,
            "Operation completed successfully"
        );
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info!(
            operation = $operation,
            $($field)*,
            "Operation completed successfully"
        );
    };
}

#[macro_export]
macro_rules! log_operation_error {
    ($operation:expr, $error:expr) => {
        tracing::error!(
            operation = $operation,
            error = %$error,
            "Operation failed"
        );
    };
    ($operation:expr, $error:expr, $($field:tt)*) => {
        tracing::error!(
            operation = $operation,
            error = %$error,
            $($field)*,
            "Operation failed"
        );
    };
}
