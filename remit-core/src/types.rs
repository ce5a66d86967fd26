//! Core data type definitions

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level client configuration, stored as TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemitConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint is joined onto
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Endpoint returning the signed-in user's profile
    pub profile_path: String,
}

/// Local persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the credential store file; a leading `~` expands to the home directory
    pub data_dir: String,
    /// How long a cached profile stays valid, in seconds
    pub profile_cache_ttl_secs: u64,
}

/// User interaction signals that prove the session is still attended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    PointerDown,
    PointerMove,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
    /// The page or window became visible again
    VisibilityRestored,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 7] = [
        ActivityKind::PointerDown,
        ActivityKind::PointerMove,
        ActivityKind::KeyPress,
        ActivityKind::Scroll,
        ActivityKind::TouchStart,
        ActivityKind::Click,
        ActivityKind::VisibilityRestored,
    ];
}

/// Why a session was ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminationReason {
    /// The user asked to sign out, or the backend rejected the credentials
    Manual,
    /// The inactivity timeout elapsed
    Timeout,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Manual => write!(f, "manual"),
            TerminationReason::Timeout => write!(f, "timeout"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Transient, non-blocking notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub description: String,
}

impl Toast {
    pub fn new(level: ToastLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn success(description: impl Into<String>) -> Self {
        Self::new(ToastLevel::Success, "Success", description)
    }

    pub fn info(description: impl Into<String>) -> Self {
        Self::new(ToastLevel::Info, "Information", description)
    }

    pub fn warning(description: impl Into<String>) -> Self {
        Self::new(ToastLevel::Warning, "Warning", description)
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self::new(ToastLevel::Error, "Error", description)
    }
}

/// Content of the expiry warning modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningPrompt {
    pub title: String,
    pub message: String,
    /// Seconds left until the session is ended
    pub seconds_remaining: u64,
    /// `seconds_remaining` rendered as `M:SS`
    pub countdown: String,
    pub extend_label: String,
    pub end_label: String,
}
