//! Failure modes of a backend call

use remit_core::{ErrorContext, RemitError};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received
    #[error("Could not reach the server: {message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 2xx response whose envelope reports `success: false`
    #[error("{message}")]
    Application { status: u16, message: String },

    /// The body was not the expected JSON envelope
    #[error("Unreadable server response (HTTP {status})")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("User is not authenticated")]
    NotAuthenticated,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. }
            | ApiError::Application { status, .. }
            | ApiError::Decode { status, .. } => Some(*status),
            ApiError::Transport { .. } | ApiError::NotAuthenticated => None,
        }
    }

    /// True for a missing login or a 401 from the backend
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ApiError::NotAuthenticated | ApiError::Http { status: 401, .. }
        )
    }
}

impl From<ApiError> for RemitError {
    fn from(error: ApiError) -> Self {
        let context = ErrorContext::new("api_client");

        match error {
            ApiError::Transport { message, source } => RemitError::Network {
                message,
                source: Some(Box::new(source)),
                context: context
                    .with_suggestion("Check network connectivity and the configured base_url"),
            },
            ApiError::NotAuthenticated => RemitError::Authentication {
                message: ApiError::NotAuthenticated.to_string(),
                context: context.with_suggestion("Run 'remit login --token <TOKEN>' first"),
            },
            ApiError::Http {
                status: 401,
                message,
            } => RemitError::Authentication {
                message,
                context: context
                    .with_metadata("status", "401")
                    .with_suggestion("Sign in again"),
            },
            other => RemitError::Api {
                message: other.to_string(),
                status: other.status(),
                context,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures() {
        assert!(ApiError::NotAuthenticated.is_auth_failure());
        assert!(ApiError::Http {
            status: 401,
            message: "expired".to_string()
        }
        .is_auth_failure());
        assert!(!ApiError::Http {
            status: 500,
            message: "boom".to_string()
        }
        .is_auth_failure());
    }

    #[test]
    fn test_conversion_into_remit_error() {
        let unauthorized: RemitError = ApiError::Http {
            status: 401,
            message: "expired".to_string(),
        }
        .into();
        assert!(matches!(unauthorized, RemitError::Authentication { .. }));
        assert!(unauthorized.is_auth_failure());

        let rejected: RemitError = ApiError::Application {
            status: 200,
            message: "Email already used".to_string(),
        }
        .into();
        match rejected {
            RemitError::Api {
                message, status, ..
            } => {
                assert_eq!(message, "Email already used");
                assert_eq!(status, Some(200));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let server: RemitError = ApiError::Http {
            status: 503,
            message: "down".to_string(),
        }
        .into();
        assert!(server.is_recoverable());
    }
}
