//! Inactivity clock settings and countdown formatting

use remit_core::{validation_error, RemitResult};
use std::time::Duration;

/// Idle time after which the session is force-ended
pub const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Idle time after which the expiry warning is shown
pub const WARNING_THRESHOLD: Duration = Duration::from_secs(25 * 60);
/// Refresh period of the countdown shown in the warning
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// The warning/timeout pair, always scheduled together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    inactivity_timeout: Duration,
    warning_threshold: Duration,
    tick: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            inactivity_timeout: INACTIVITY_TIMEOUT,
            warning_threshold: WARNING_THRESHOLD,
            tick: COUNTDOWN_TICK,
        }
    }
}

impl SessionTimings {
    /// Build custom timings. The warning must come strictly before the timeout and the
    /// gap must be a whole number of seconds, since the countdown ticks once per second.
    pub fn new(inactivity_timeout: Duration, warning_threshold: Duration) -> RemitResult<Self> {
        if warning_threshold.is_zero() {
            return Err(validation_error!(
                "warning threshold must be greater than zero",
                "warning_threshold",
                "session_timings"
            ));
        }

        if warning_threshold >= inactivity_timeout {
            return Err(validation_error!(
                format!(
                    "warning threshold ({}s) must be shorter than the inactivity timeout ({}s)",
                    warning_threshold.as_secs(),
                    inactivity_timeout.as_secs()
                ),
                "warning_threshold",
                "session_timings"
            ));
        }

        if (inactivity_timeout - warning_threshold).subsec_nanos() != 0 {
            return Err(validation_error!(
                "countdown length must be a whole number of seconds",
                "inactivity_timeout",
                "session_timings"
            ));
        }

        Ok(Self {
            inactivity_timeout,
            warning_threshold,
            tick: COUNTDOWN_TICK,
        })
    }

    pub fn inactivity_timeout(&self) -> Duration {
        self.inactivity_timeout
    }

    pub fn warning_threshold(&self) -> Duration {
        self.warning_threshold
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Length of the countdown shown in the warning
    pub fn countdown(&self) -> Duration {
        self.inactivity_timeout - self.warning_threshold
    }

    pub fn countdown_secs(&self) -> u64 {
        self.countdown().as_secs()
    }

    /// Whole minutes of the inactivity timeout, used in the sign-out message
    pub fn inactivity_minutes(&self) -> u64 {
        self.inactivity_timeout.as_secs() / 60
    }
}

/// Render seconds as `M:SS`
pub fn format_countdown(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(305), "5:05");
        assert_eq!(format_countdown(300), "5:00");
        assert_eq!(format_countdown(247), "4:07");
        assert_eq!(format_countdown(60), "1:00");
        assert_eq!(format_countdown(59), "0:59");
        assert_eq!(format_countdown(0), "0:00");
        assert_eq!(format_countdown(1800), "30:00");
    }

    #[test]
    fn test_default_timings() {
        let timings = SessionTimings::default();
        assert_eq!(timings.inactivity_timeout(), Duration::from_secs(1800));
        assert_eq!(timings.warning_threshold(), Duration::from_secs(1500));
        assert_eq!(timings.countdown_secs(), 300);
        assert_eq!(timings.inactivity_minutes(), 30);
    }

    #[test]
    fn test_rejects_inverted_timings() {
        assert!(SessionTimings::new(Duration::from_secs(60), Duration::from_secs(60)).is_err());
        assert!(SessionTimings::new(Duration::from_secs(60), Duration::from_secs(90)).is_err());
        assert!(SessionTimings::new(Duration::from_secs(60), Duration::ZERO).is_err());
        assert!(
            SessionTimings::new(Duration::from_millis(60_500), Duration::from_secs(30)).is_err()
        );

        let short = SessionTimings::new(Duration::from_secs(60), Duration::from_secs(45)).unwrap();
        assert_eq!(short.countdown_secs(), 15);
    }
}
