//! Interactive session console
//!
//! Stands in for the browser page: each input line is a user interaction, a few words
//! are commands. Runs until the session ends or the user quits.

use crate::terminal::{TerminalNotifier, WarningChoice};
use remit_core::{ActivityKind, TerminationReason};
use remit_session::{format_countdown, ActivityHub, SessionLifecycleManager};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// "Stay connected"
    Extend,
    /// Sign out now
    End,
    /// Show the time left without touching the clock
    Remaining,
    /// The window was hidden
    Away,
    /// The window is visible again
    Back,
    Help,
    Quit,
    /// Anything else is plain typing
    Activity,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "extend" | "stay" => ConsoleCommand::Extend,
            "end" | "logout" => ConsoleCommand::End,
            "remaining" | "time" => ConsoleCommand::Remaining,
            "away" => ConsoleCommand::Away,
            "back" => ConsoleCommand::Back,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            _ => ConsoleCommand::Activity,
        }
    }
}

pub struct SessionConsole {
    pub manager: SessionLifecycleManager,
    pub hub: Arc<ActivityHub>,
    pub notifier: Arc<TerminalNotifier>,
    pub ended: Arc<Notify>,
}

impl SessionConsole {
    pub async fn run(&self) -> std::io::Result<()> {
        print_help();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                _ = self.ended.notified() => {
                    debug!("Session ended, leaving console");
                    return Ok(());
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        return Ok(());
                    };
                    if !self.handle(ConsoleCommand::parse(&line)) {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Returns false when the console should close
    pub fn handle(&self, command: ConsoleCommand) -> bool {
        debug!(?command, "Console command");

        match command {
            ConsoleCommand::Extend => {
                if !self.notifier.respond(WarningChoice::Extend) {
                    self.manager.extend_session();
                }
                println!("Session extended, {}", self.remaining());
            }
            ConsoleCommand::End => {
                if !self.notifier.respond(WarningChoice::EndNow) {
                    self.manager.terminate_session(TerminationReason::Manual);
                }
                return false;
            }
            ConsoleCommand::Remaining => println!("{}", self.remaining()),
            ConsoleCommand::Away => {
                self.hub.visibility_changed(false);
                println!("Window hidden, the inactivity clock keeps running");
            }
            ConsoleCommand::Back => {
                self.hub.visibility_changed(true);
            }
            ConsoleCommand::Help => print_help(),
            ConsoleCommand::Quit => return false,
            ConsoleCommand::Activity => {
                self.hub.emit(ActivityKind::KeyPress);
            }
        }

        !self.manager.is_terminated()
    }

    fn remaining(&self) -> String {
        format!(
            "{} left before automatic sign-out",
            format_countdown(self.manager.get_remaining_seconds())
        )
    }
}

fn print_help() {
    println!("Session console. Any input counts as activity.");
    println!("  extend     stay connected");
    println!("  end        sign out now");
    println!("  remaining  time left before automatic sign-out");
    println!("  away/back  simulate hiding and showing the window");
    println!("  quit       leave the console, the session stays signed in");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::TerminalTerminator;
    use remit_session::{MemoryStore, SessionCollaborators, SessionTimings, StoredCredentials};
    use std::time::Duration;

    fn console() -> SessionConsole {
        let notifier = Arc::new(TerminalNotifier::new());
        let ended = Arc::new(Notify::new());
        let hub = Arc::new(ActivityHub::new());
        let credentials = Arc::new(StoredCredentials::new(
            Arc::new(MemoryStore::new()),
            Duration::from_secs(1800),
        ));

        let manager = SessionLifecycleManager::start(
            SessionTimings::default(),
            SessionCollaborators {
                notifier: notifier.clone(),
                credentials,
                terminator: Arc::new(TerminalTerminator::new(ended.clone())),
            },
            hub.as_ref(),
        )
        .unwrap();

        SessionConsole {
            manager,
            hub,
            notifier,
            ended,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_resets_but_remaining_does_not() {
        let console = console();
        tokio::time::sleep(Duration::from_secs(600)).await;

        assert!(console.handle(ConsoleCommand::Remaining));
        assert_eq!(console.manager.get_remaining_seconds(), 1200);

        assert!(console.handle(ConsoleCommand::Activity));
        assert_eq!(console.manager.get_remaining_seconds(), 1800);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extend_answers_open_warning() {
        let console = console();
        tokio::time::sleep(Duration::from_secs(25 * 60 + 1)).await;
        assert!(console.notifier.is_warning_open());

        assert!(console.handle(ConsoleCommand::Extend));
        assert!(!console.manager.is_warning_active());
        assert!(!console.notifier.is_warning_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_closes_console_and_session() {
        let console = console();

        assert!(!console.handle(ConsoleCommand::End));
        assert!(console.manager.is_terminated());
        console.ended.notified().await;
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleCommand::parse("extend"), ConsoleCommand::Extend);
        assert_eq!(ConsoleCommand::parse("  STAY \n"), ConsoleCommand::Extend);
        assert_eq!(ConsoleCommand::parse("end"), ConsoleCommand::End);
        assert_eq!(ConsoleCommand::parse("remaining"), ConsoleCommand::Remaining);
        assert_eq!(ConsoleCommand::parse("away"), ConsoleCommand::Away);
        assert_eq!(ConsoleCommand::parse("back"), ConsoleCommand::Back);
        assert_eq!(ConsoleCommand::parse("exit"), ConsoleCommand::Quit);
        assert_eq!(ConsoleCommand::parse(""), ConsoleCommand::Activity);
        assert_eq!(ConsoleCommand::parse("hello there"), ConsoleCommand::Activity);
    }
}
