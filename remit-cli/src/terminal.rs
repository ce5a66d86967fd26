//! Terminal front end for the session lifecycle: warning, countdown and toasts on stderr

use remit_core::{
    Notifier, RemitResult, SessionTerminator, Toast, ToastLevel, WarningActions, WarningPrompt,
};
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

/// Which button of the expiry warning the user picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningChoice {
    Extend,
    EndNow,
}

#[derive(Default)]
pub struct TerminalNotifier {
    open_warning: Mutex<Option<Arc<dyn WarningActions>>>,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_warning_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Forward a choice to the open warning. Returns false when no warning is shown.
    pub fn respond(&self, choice: WarningChoice) -> bool {
        // Release the slot before calling out, the manager hides the warning re-entrantly
        let actions = self.lock().clone();
        match actions {
            Some(actions) => {
                match choice {
                    WarningChoice::Extend => actions.extend(),
                    WarningChoice::EndNow => actions.end_now(),
                }
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn WarningActions>>> {
        self.open_warning
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for TerminalNotifier {
    fn show_warning(
        &self,
        prompt: &WarningPrompt,
        actions: Arc<dyn WarningActions>,
    ) -> RemitResult<()> {
        *self.lock() = Some(actions);

        let mut err = std::io::stderr().lock();
        writeln!(err)?;
        writeln!(err, "⚠️  {}", prompt.title)?;
        writeln!(err, "    {}", prompt.message)?;
        writeln!(
            err,
            "    Type 'extend' to {} or 'end' to {}.",
            prompt.extend_label.to_lowercase(),
            prompt.end_label.to_lowercase()
        )?;
        write!(err, "    Time left: {}", prompt.countdown)?;
        err.flush()?;
        Ok(())
    }

    fn update_countdown(&self, countdown: &str) -> RemitResult<()> {
        let mut err = std::io::stderr().lock();
        write!(err, "\r    Time left: {}  ", countdown)?;
        err.flush()?;
        Ok(())
    }

    fn hide_warning(&self) -> RemitResult<()> {
        *self.lock() = None;
        eprintln!();
        Ok(())
    }

    fn toast(&self, toast: &Toast) -> RemitResult<()> {
        let icon = match toast.level {
            ToastLevel::Success => "✅",
            ToastLevel::Info => "ℹ️ ",
            ToastLevel::Warning => "⚠️ ",
            ToastLevel::Error => "❌",
        };
        eprintln!("{} {}: {}", icon, toast.title, toast.description);
        Ok(())
    }
}

/// Leaves the authenticated console once the session ends
pub struct TerminalTerminator {
    ended: Arc<Notify>,
}

impl TerminalTerminator {
    pub fn new(ended: Arc<Notify>) -> Self {
        Self { ended }
    }
}

impl SessionTerminator for TerminalTerminator {
    fn redirect_to_login(&self) {
        eprintln!("Run 'remit login --token <TOKEN>' to sign in again.");
        // Stores a permit if the console is not waiting yet
        self.ended.notify_one();
    }
}
