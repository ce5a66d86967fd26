//! Session Lifecycle Manager - inactivity timeout with a cancellable warning
//!
//! Every activity signal cancels the pending warning/logout timer pair and schedules a
//! fresh pair from the same instant. When the warning timer fires the user gets a modal
//! with a live countdown; the logout timer (or the countdown reaching zero, whichever
//! runs first) ends the session.
//!
//! Timer tasks only hold a weak reference to the manager and carry the scheduling
//! epoch they were created in. A task whose epoch is no longer current does nothing,
//! so a timer that was already running when it got cancelled can never act on a
//! newer schedule.
//!
//! A transition and the UI calls it produces run under one ordering lock, so the
//! notifier sees show/update/hide in the same order the state changed, whichever
//! worker thread each transition ran on.

use crate::timings::{format_countdown, SessionTimings};
use remit_core::{
    ActivityEventSource, ActivityKind, CredentialStore, ErrorContext, Notifier, RemitError,
    RemitResult, SessionTerminator, TerminationReason, Toast, ToastLevel, WarningActions,
    WarningPrompt,
};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Observable state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    /// The expiry warning is displayed
    Warning,
    /// Absorbing; a new login needs a new manager
    Terminated,
}

/// Environment capabilities the manager drives
#[derive(Clone)]
pub struct SessionCollaborators {
    pub notifier: Arc<dyn Notifier>,
    pub credentials: Arc<dyn CredentialStore>,
    pub terminator: Arc<dyn SessionTerminator>,
}

/// Handle to the single lifecycle of one authenticated session.
///
/// Clones share the same state. Every operation is synchronous and never fails from
/// the caller's point of view; collaborator failures are logged and skipped.
#[derive(Clone)]
pub struct SessionLifecycleManager {
    shared: Arc<Shared>,
}

struct Shared {
    timings: SessionTimings,
    collaborators: SessionCollaborators,
    runtime: Handle,
    // Always taken before `state`
    effects: Mutex<()>,
    state: Mutex<SessionState>,
}

struct SessionState {
    phase: SessionPhase,
    last_activity_at: Instant,
    epoch: u64,
    countdown_remaining: u64,
    warning_timer: Option<JoinHandle<()>>,
    logout_timer: Option<JoinHandle<()>>,
    countdown: Option<JoinHandle<()>>,
}

impl SessionState {
    fn cancel_timers(&mut self) {
        let handles = [
            self.warning_timer.take(),
            self.logout_timer.take(),
            self.countdown.take(),
        ];
        for handle in handles.into_iter().flatten() {
            handle.abort();
        }
    }

    fn pending_timers(&self) -> usize {
        [&self.warning_timer, &self.logout_timer, &self.countdown]
            .into_iter()
            .filter(|handle| handle.as_ref().is_some_and(|h| !h.is_finished()))
            .count()
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel_timers();
    }
}

impl SessionLifecycleManager {
    /// Start tracking a freshly authenticated session.
    ///
    /// Counts as an activity event: the first timer pair is scheduled from now. One
    /// listener per [`ActivityKind`] is attached to `activity`. Must be called from
    /// within a Tokio runtime.
    pub fn start(
        timings: SessionTimings,
        collaborators: SessionCollaborators,
        activity: &dyn ActivityEventSource,
    ) -> RemitResult<Self> {
        let runtime = Handle::try_current().map_err(|e| RemitError::Internal {
            message: "session lifecycle requires a running Tokio runtime".to_string(),
            source: Some(Box::new(e)),
            context: ErrorContext::new("session_manager").with_operation("start"),
        })?;

        let now = Instant::now();
        let manager = Self {
            shared: Arc::new(Shared {
                timings,
                collaborators,
                runtime,
                effects: Mutex::new(()),
                state: Mutex::new(SessionState {
                    phase: SessionPhase::Active,
                    last_activity_at: now,
                    epoch: 0,
                    countdown_remaining: 0,
                    warning_timer: None,
                    logout_timer: None,
                    countdown: None,
                }),
            }),
        };

        {
            let mut state = manager.lock();
            manager.schedule(&mut state, now);
        }
        manager.attach(activity);

        info!(
            timeout_secs = timings.inactivity_timeout().as_secs(),
            warning_secs = timings.warning_threshold().as_secs(),
            "Session lifecycle started"
        );
        Ok(manager)
    }

    /// Record user activity: dismiss any warning and restart both timers from now
    pub fn notify_activity(&self) {
        let _effects = self.effects();
        let now = Instant::now();
        let was_warning = {
            let mut state = self.lock();
            if state.phase == SessionPhase::Terminated {
                trace!("Activity ignored, session already terminated");
                return;
            }

            let was_warning = state.phase == SessionPhase::Warning;
            state.phase = SessionPhase::Active;
            state.last_activity_at = now;
            state.cancel_timers();
            self.schedule(&mut state, now);
            was_warning
        };

        trace!("Inactivity timers reset");
        if was_warning {
            info!("Expiry warning dismissed");
            log_failure(self.notifier().hide_warning(), "hide_warning");
        }
    }

    /// Explicit "stay connected"; also used by authenticated API calls
    pub fn extend_session(&self) {
        debug!("Session extension requested");
        self.notify_activity();
    }

    /// End the session. Only the first call has side effects.
    pub fn terminate_session(&self, reason: TerminationReason) {
        self.end_session(reason, None, None);
    }

    /// Like [`terminate_session`](Self::terminate_session), but `notice` replaces the
    /// usual sign-out toast
    pub fn terminate_session_with(&self, reason: TerminationReason, notice: Toast) {
        self.end_session(reason, None, Some(notice));
    }

    /// Whole seconds left before the inactivity timeout; 0 once terminated
    pub fn get_remaining_seconds(&self) -> u64 {
        let state = self.lock();
        if state.phase == SessionPhase::Terminated {
            return 0;
        }

        let deadline = state.last_activity_at + self.shared.timings.inactivity_timeout();
        deadline.saturating_duration_since(Instant::now()).as_secs()
    }

    pub fn is_warning_active(&self) -> bool {
        self.lock().phase == SessionPhase::Warning
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    pub fn is_terminated(&self) -> bool {
        self.phase() == SessionPhase::Terminated
    }

    pub fn timings(&self) -> SessionTimings {
        self.shared.timings
    }

    pub fn last_activity_at(&self) -> Instant {
        self.lock().last_activity_at
    }

    fn attach(&self, source: &dyn ActivityEventSource) {
        for kind in ActivityKind::ALL {
            let weak = Arc::downgrade(&self.shared);
            source.subscribe(
                kind,
                Arc::new(move |kind: ActivityKind| {
                    if let Some(manager) = SessionLifecycleManager::upgrade(&weak) {
                        trace!(?kind, "Activity received");
                        manager.notify_activity();
                    }
                }),
            );
        }
    }

    /// Schedule the warning/logout pair from `now`. Callers cancel the old pair first.
    fn schedule(&self, state: &mut SessionState, now: Instant) {
        state.epoch += 1;
        let epoch = state.epoch;
        let timings = self.shared.timings;

        let weak = Arc::downgrade(&self.shared);
        let warning_at = now + timings.warning_threshold();
        state.warning_timer = Some(self.shared.runtime.spawn(async move {
            time::sleep_until(warning_at).await;
            if let Some(manager) = SessionLifecycleManager::upgrade(&weak) {
                manager.on_warning_threshold_elapsed(epoch);
            }
        }));

        let weak = Arc::downgrade(&self.shared);
        let logout_at = now + timings.inactivity_timeout();
        state.logout_timer = Some(self.shared.runtime.spawn(async move {
            time::sleep_until(logout_at).await;
            if let Some(manager) = SessionLifecycleManager::upgrade(&weak) {
                manager.on_hard_timeout_elapsed(epoch);
            }
        }));
    }

    fn on_warning_threshold_elapsed(&self, epoch: u64) {
        let seconds = self.shared.timings.countdown_secs();
        let _effects = self.effects();
        {
            let mut state = self.lock();
            if state.epoch != epoch || state.phase != SessionPhase::Active {
                debug!("Warning timer ignored");
                return;
            }

            state.warning_timer = None;
            state.phase = SessionPhase::Warning;
            state.countdown_remaining = seconds;
            state.countdown = Some(self.spawn_countdown(epoch));
        }

        info!(seconds_remaining = seconds, "Showing session expiry warning");
        let actions: Arc<dyn WarningActions> = Arc::new(WarningResponder {
            shared: Arc::downgrade(&self.shared),
        });
        log_failure(
            self.notifier().show_warning(&warning_prompt(seconds), actions),
            "show_warning",
        );
    }

    fn spawn_countdown(&self, epoch: u64) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.shared);
        let tick = self.shared.timings.tick();
        let first_tick = Instant::now() + tick;

        self.shared.runtime.spawn(async move {
            let mut ticker = time::interval_at(first_tick, tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

            loop {
                ticker.tick().await;
                let Some(manager) = SessionLifecycleManager::upgrade(&weak) else {
                    break;
                };
                if !manager.on_countdown_tick(epoch) {
                    break;
                }
            }
        })
    }

    /// Returns false once the ticker should stop
    fn on_countdown_tick(&self, epoch: u64) -> bool {
        let remaining = {
            let _effects = self.effects();
            let remaining = {
                let mut state = self.lock();
                if state.epoch != epoch || state.phase != SessionPhase::Warning {
                    return false;
                }

                state.countdown_remaining = state.countdown_remaining.saturating_sub(1);
                if state.countdown_remaining == 0 {
                    state.countdown = None;
                }
                state.countdown_remaining
            };

            log_failure(
                self.notifier().update_countdown(&format_countdown(remaining)),
                "update_countdown",
            );
            remaining
        };

        if remaining == 0 {
            debug!("Countdown reached zero");
            self.end_session(TerminationReason::Timeout, Some(epoch), None);
            return false;
        }
        true
    }

    fn on_hard_timeout_elapsed(&self, epoch: u64) {
        {
            let mut state = self.lock();
            if state.epoch == epoch {
                state.logout_timer = None;
            }
        }
        self.end_session(TerminationReason::Timeout, Some(epoch), None);
    }

    /// Shared teardown. With `expected_epoch`, only ends a session still on that schedule.
    fn end_session(
        &self,
        reason: TerminationReason,
        expected_epoch: Option<u64>,
        notice: Option<Toast>,
    ) {
        let _effects = self.effects();
        let was_warning = {
            let mut state = self.lock();
            if state.phase == SessionPhase::Terminated {
                debug!(%reason, "Session already terminated");
                return;
            }
            if expected_epoch.is_some_and(|epoch| epoch != state.epoch) {
                debug!(%reason, "Stale timer ignored");
                return;
            }

            let was_warning = state.phase == SessionPhase::Warning;
            state.phase = SessionPhase::Terminated;
            state.epoch += 1;
            state.cancel_timers();
            was_warning
        };

        info!(%reason, "Terminating session");
        let collaborators = &self.shared.collaborators;

        if was_warning {
            log_failure(collaborators.notifier.hide_warning(), "hide_warning");
        }
        log_failure(collaborators.credentials.clear_token(), "clear_token");
        log_failure(collaborators.credentials.clear_profile(), "clear_profile");
        let toast = notice.unwrap_or_else(|| termination_toast(reason, &self.shared.timings));
        log_failure(collaborators.notifier.toast(&toast), "toast");
        collaborators.terminator.redirect_to_login();
    }

    fn notifier(&self) -> &dyn Notifier {
        self.shared.collaborators.notifier.as_ref()
    }

    fn effects(&self) -> MutexGuard<'_, ()> {
        self.shared
            .effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn upgrade(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    #[cfg(test)]
    fn pending_timers(&self) -> usize {
        self.lock().pending_timers()
    }

    #[cfg(test)]
    fn current_epoch(&self) -> u64 {
        self.lock().epoch
    }
}

impl fmt::Debug for SessionLifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLifecycleManager")
            .field("phase", &self.phase())
            .field("timings", &self.shared.timings)
            .finish()
    }
}

/// Actions handed to the Notifier with the warning
struct WarningResponder {
    shared: Weak<Shared>,
}

impl WarningActions for WarningResponder {
    fn extend(&self) {
        if let Some(manager) = SessionLifecycleManager::upgrade(&self.shared) {
            manager.extend_session();
        }
    }

    fn end_now(&self) {
        if let Some(manager) = SessionLifecycleManager::upgrade(&self.shared) {
            manager.terminate_session(TerminationReason::Manual);
        }
    }
}

fn warning_prompt(seconds: u64) -> WarningPrompt {
    WarningPrompt {
        title: "Session about to expire".to_string(),
        message: "You will be signed out soon because of inactivity.".to_string(),
        seconds_remaining: seconds,
        countdown: format_countdown(seconds),
        extend_label: "Stay connected".to_string(),
        end_label: "Sign out now".to_string(),
    }
}

fn termination_toast(reason: TerminationReason, timings: &SessionTimings) -> Toast {
    match reason {
        TerminationReason::Manual => Toast::new(
            ToastLevel::Info,
            "Signed out",
            "You have been signed out successfully.",
        ),
        TerminationReason::Timeout => Toast::new(
            ToastLevel::Warning,
            "Session expired",
            format!(
                "You were signed out automatically after {} minutes of inactivity.",
                timings.inactivity_minutes()
            ),
        ),
    }
}

fn log_failure(result: RemitResult<()>, operation: &str) {
    if let Err(e) = result {
        warn!(operation, error = %e, "Session side effect failed, continuing");
    }
}
