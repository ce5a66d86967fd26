//! Fakes for the client tests

#![allow(dead_code)]

use remit_core::{
    ApiConfig, Notifier, RemitResult, SessionTerminator, Toast, WarningActions, WarningPrompt,
};
use remit_client::ApiClient;
use remit_session::{MemoryStore, StoredCredentials};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct ToastRecorder {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastRecorder {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.toasts().into_iter().map(|t| t.description).collect()
    }
}

impl Notifier for ToastRecorder {
    fn show_warning(
        &self,
        _prompt: &WarningPrompt,
        _actions: Arc<dyn WarningActions>,
    ) -> RemitResult<()> {
        Ok(())
    }

    fn update_countdown(&self, _countdown: &str) -> RemitResult<()> {
        Ok(())
    }

    fn hide_warning(&self) -> RemitResult<()> {
        Ok(())
    }

    fn toast(&self, toast: &Toast) -> RemitResult<()> {
        self.toasts.lock().unwrap().push(toast.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingTerminator {
    redirects: AtomicUsize,
}

impl CountingTerminator {
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl SessionTerminator for CountingTerminator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub credentials: Arc<StoredCredentials>,
    pub notifier: Arc<ToastRecorder>,
}

impl Fixture {
    pub fn signed_in(token: &str) -> Self {
        let fixture = Self::signed_out();
        fixture
            .credentials
            .save_login::<serde_json::Value>(token, None, None)
            .unwrap();
        fixture
    }

    pub fn signed_out() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            credentials: Arc::new(StoredCredentials::new(
                store.clone(),
                Duration::from_secs(30 * 60),
            )),
            store,
            notifier: Arc::new(ToastRecorder::default()),
        }
    }

    pub fn client(&self, base_url: &str) -> ApiClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        };
        ApiClient::new(&config, self.credentials.clone(), self.notifier.clone()).unwrap()
    }
}
