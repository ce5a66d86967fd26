//! Unified error handling system
//!
//! Structured error types carrying a context for debugging, plus recovery suggestions
//! that the CLI prints next to the message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type RemitResult<T> = Result<T, RemitError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type shared by the Remit crates
#[derive(Error, Debug)]
pub enum RemitError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl RemitError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            RemitError::Config { context, .. } => Some(context),
            RemitError::Storage { context, .. } => Some(context),
            RemitError::Network { context, .. } => Some(context),
            RemitError::Authentication { context, .. } => Some(context),
            RemitError::Api { context, .. } => Some(context),
            RemitError::Validation { context, .. } => Some(context),
            RemitError::NotFound { context, .. } => Some(context),
            RemitError::Internal { context, .. } => Some(context),
            RemitError::Io(_) | RemitError::Serialization(_) => None,
        }
    }

    /// Transient failures the caller may retry
    pub fn is_recoverable(&self) -> bool {
        match self {
            RemitError::Network { .. } => true,
            RemitError::Api { status, .. } => matches!(status, Some(s) if *s >= 500),
            RemitError::Storage { .. } => true,
            _ => false,
        }
    }

    /// Whether the error means the stored credentials are no longer accepted
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            RemitError::Authentication { .. } | RemitError::Api { status: Some(401), .. }
        )
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        match self {
            RemitError::Internal { .. } => {
                error!(error_id = ?error_id, error = %self, "Internal error occurred");
            }
            RemitError::Config { .. } | RemitError::Validation { .. } => {
                error!(error_id = ?error_id, error = %self, "Configuration or validation error");
            }
            RemitError::Network { .. } | RemitError::Storage { .. } => {
                warn!(error_id = ?error_id, error = %self, "Recoverable error");
            }
            _ => {
                error!(error_id = ?error_id, error = %self, "Error occurred");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::RemitError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'remit config --init' to create a default config"),
        }
    };
}

#[macro_export]
macro_rules! storage_error {
    ($msg:expr, $component:expr) => {
        $crate::RemitError::Storage {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::RemitError::Storage {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check that the data directory is writable"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::RemitError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let context = ErrorContext::new("credentials")
            .with_operation("clear_token")
            .with_metadata("key", "auth_token")
            .with_suggestion("retry");

        assert_eq!(context.component, "credentials");
        assert_eq!(context.operation.as_deref(), Some("clear_token"));
        assert_eq!(context.metadata.get("key").map(String::as_str), Some("auth_token"));
        assert_eq!(context.recovery_suggestions, vec!["retry".to_string()]);
    }

    #[test]
    fn test_auth_failure_classification() {
        let unauthorized = RemitError::Api {
            message: "expired".to_string(),
            status: Some(401),
            context: ErrorContext::new("test"),
        };
        let server = RemitError::Api {
            message: "boom".to_string(),
            status: Some(503),
            context: ErrorContext::new("test"),
        };

        assert!(unauthorized.is_auth_failure());
        assert!(!unauthorized.is_recoverable());
        assert!(!server.is_auth_failure());
        assert!(server.is_recoverable());
    }
}
