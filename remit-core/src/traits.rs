//! Capabilities the session lifecycle consumes from its environment
//!
//! The session manager only talks to the UI, storage and navigation layers through
//! these traits, so any front end (terminal, web view, test recorder) can host it.

use crate::error::RemitResult;
use crate::types::{ActivityKind, Toast, WarningPrompt};
use std::sync::Arc;

/// The two choices offered by the expiry warning
pub trait WarningActions: Send + Sync {
    /// "Stay connected"
    fn extend(&self);
    /// "End now"
    fn end_now(&self);
}

/// Presents the expiry warning and transient toasts.
///
/// Calls arrive in session order and must return without calling back into the
/// session; user choices go through [`WarningActions`] from the UI's own context.
pub trait Notifier: Send + Sync {
    /// Show the blocking expiry warning. `actions` stays valid for the lifetime of the modal.
    fn show_warning(&self, prompt: &WarningPrompt, actions: Arc<dyn WarningActions>)
        -> RemitResult<()>;

    /// Refresh the live `M:SS` countdown of the visible warning
    fn update_countdown(&self, countdown: &str) -> RemitResult<()>;

    fn hide_warning(&self) -> RemitResult<()>;

    fn toast(&self, toast: &Toast) -> RemitResult<()>;
}

/// Navigates away from the authenticated part of the application
pub trait SessionTerminator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Persisted authentication material
pub trait CredentialStore: Send + Sync {
    fn token(&self) -> RemitResult<Option<String>>;

    fn set_token(&self, token: &str) -> RemitResult<()>;

    /// Remove the bearer token and any refresh token
    fn clear_token(&self) -> RemitResult<()>;

    /// Remove the cached user profile
    fn clear_profile(&self) -> RemitResult<()>;
}

pub type ActivityListener = Arc<dyn Fn(ActivityKind) + Send + Sync>;

/// Source of user interaction signals
pub trait ActivityEventSource: Send + Sync {
    /// Attach the listener for one signal type. Listeners are kept until the source is dropped.
    fn subscribe(&self, kind: ActivityKind, listener: ActivityListener);
}
