//! Recording fakes shared by the lifecycle tests

#![allow(dead_code)]

use remit_core::{
    storage_error, CredentialStore, Notifier, RemitResult, SessionTerminator, Toast,
    WarningActions, WarningPrompt,
};
use remit_session::{
    ActivityHub, MemoryStore, SessionCollaborators, SessionLifecycleManager, SessionTimings,
    StoredCredentials,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ShowWarning(WarningPrompt),
    Countdown(String),
    HideWarning,
    Toast(Toast),
}

#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<UiEvent>>,
    actions: Mutex<Option<Arc<dyn WarningActions>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn warnings_shown(&self) -> usize {
        self.count(|e| matches!(e, UiEvent::ShowWarning(_)))
    }

    pub fn warnings_hidden(&self) -> usize {
        self.count(|e| matches!(e, UiEvent::HideWarning))
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Toast(toast) => Some(toast),
                _ => None,
            })
            .collect()
    }

    pub fn last_countdown(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|e| match e {
            UiEvent::Countdown(value) => Some(value),
            _ => None,
        })
    }

    /// Actions handed over with the most recent warning
    pub fn actions(&self) -> Arc<dyn WarningActions> {
        self.actions
            .lock()
            .unwrap()
            .clone()
            .expect("no warning has been shown")
    }

    fn count(&self, predicate: impl Fn(&UiEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }

    fn record(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Notifier for RecordingNotifier {
    fn show_warning(
        &self,
        prompt: &WarningPrompt,
        actions: Arc<dyn WarningActions>,
    ) -> RemitResult<()> {
        *self.actions.lock().unwrap() = Some(actions);
        self.record(UiEvent::ShowWarning(prompt.clone()));
        Ok(())
    }

    fn update_countdown(&self, countdown: &str) -> RemitResult<()> {
        self.record(UiEvent::Countdown(countdown.to_string()));
        Ok(())
    }

    fn hide_warning(&self) -> RemitResult<()> {
        self.record(UiEvent::HideWarning);
        Ok(())
    }

    fn toast(&self, toast: &Toast) -> RemitResult<()> {
        self.record(UiEvent::Toast(toast.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingTerminator {
    redirects: AtomicUsize,
}

impl RecordingTerminator {
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl SessionTerminator for RecordingTerminator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// Credential store whose storage is unavailable
pub struct BrokenCredentials;

impl CredentialStore for BrokenCredentials {
    fn token(&self) -> RemitResult<Option<String>> {
        Err(storage_error!("storage unavailable", "broken_store"))
    }

    fn set_token(&self, _token: &str) -> RemitResult<()> {
        Err(storage_error!("storage unavailable", "broken_store"))
    }

    fn clear_token(&self) -> RemitResult<()> {
        Err(storage_error!("storage unavailable", "broken_store"))
    }

    fn clear_profile(&self) -> RemitResult<()> {
        Err(storage_error!("storage unavailable", "broken_store"))
    }
}

pub struct Harness {
    pub manager: SessionLifecycleManager,
    pub hub: ActivityHub,
    pub notifier: Arc<RecordingNotifier>,
    pub terminator: Arc<RecordingTerminator>,
    pub store: Arc<MemoryStore>,
    pub credentials: Arc<StoredCredentials>,
}

/// Start a session with default timings over an in-memory store holding a login
pub fn start_session() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let credentials = Arc::new(StoredCredentials::new(
        store.clone(),
        Duration::from_secs(30 * 60),
    ));
    credentials
        .save_login("token-123", Some("refresh-456"), Some(&serde_json::json!({"id": 1})))
        .unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let terminator = Arc::new(RecordingTerminator::default());
    let hub = ActivityHub::new();

    let manager = SessionLifecycleManager::start(
        SessionTimings::default(),
        SessionCollaborators {
            notifier: notifier.clone(),
            credentials: credentials.clone(),
            terminator: terminator.clone(),
        },
        &hub,
    )
    .unwrap();

    Harness {
        manager,
        hub,
        notifier,
        terminator,
        store,
        credentials,
    }
}
