//! Activity hub - fan-in point for user interaction signals
//!
//! Front ends forward raw input events here; the hub delivers them to the one listener
//! attached per signal type.

use remit_core::{ActivityEventSource, ActivityKind, ActivityListener};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{trace, warn};

/// In-process [`ActivityEventSource`] with one listener slot per [`ActivityKind`]
#[derive(Default)]
pub struct ActivityHub {
    listeners: RwLock<HashMap<ActivityKind, ActivityListener>>,
}

impl ActivityHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a signal. Returns false when nobody listens for `kind`.
    pub fn emit(&self, kind: ActivityKind) -> bool {
        // Clone out of the lock so the listener may subscribe or emit itself
        let listener = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned();

        match listener {
            Some(listener) => {
                trace!(?kind, "Activity signal");
                listener(kind);
                true
            }
            None => false,
        }
    }

    /// Page visibility changed. Only becoming visible counts as activity.
    pub fn visibility_changed(&self, visible: bool) -> bool {
        visible && self.emit(ActivityKind::VisibilityRestored)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl ActivityEventSource for ActivityHub {
    fn subscribe(&self, kind: ActivityKind, listener: ActivityListener) {
        let previous = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, listener);

        if previous.is_some() {
            warn!(?kind, "Replacing existing activity listener");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_emit_reaches_subscribed_listener() {
        let hub = ActivityHub::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        hub.subscribe(
            ActivityKind::KeyPress,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert!(hub.emit(ActivityKind::KeyPress));
        assert!(hub.emit(ActivityKind::KeyPress));
        assert!(!hub.emit(ActivityKind::Scroll));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_one_listener_per_kind() {
        let hub = ActivityHub::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&first);
        hub.subscribe(
            ActivityKind::Click,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let counter = Arc::clone(&second);
        hub.subscribe(
            ActivityKind::Click,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        hub.emit(ActivityKind::Click);
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hidden_page_is_not_activity() {
        let hub = ActivityHub::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        hub.subscribe(
            ActivityKind::VisibilityRestored,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert!(!hub.visibility_changed(false));
        assert!(hub.visibility_changed(true));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
