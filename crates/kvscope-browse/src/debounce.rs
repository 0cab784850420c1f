use std::time::{Duration, Instant};

/// Quiet period after the last keystroke before a search is issued
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Single pending search timer.
///
/// Time is passed in by the caller, so the timer is a pure function of
/// "time since last keystroke" and tests never sleep.
#[derive(Clone, Debug)]
pub struct SearchDebounce {
    quiet: Duration,
    pending: Option<PendingSearch>,
}

#[derive(Clone, Debug)]
struct PendingSearch {
    text: String,
    last_input: Instant,
}

impl SearchDebounce {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Record a keystroke; replaces any pending search and restarts the timer
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some(PendingSearch {
            text: text.into(),
            last_input: now,
        });
    }

    /// When the pending search becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.last_input + self.quiet)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.last_input) >= self.quiet)
    }

    /// Take the pending search text if its quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        if self.is_due(now) {
            self.take()
        } else {
            None
        }
    }

    /// Take the pending search text regardless of the timer
    pub fn take(&mut self) -> Option<String> {
        self.pending.take().map(|p| p.text)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending_text(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.text.as_str())
    }
}

impl Default for SearchDebounce {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debounce = SearchDebounce::default();
        debounce.input("al", start);

        assert_eq!(debounce.poll(start + Duration::from_millis(299)), None);
        assert_eq!(
            debounce.poll(start + Duration::from_millis(300)),
            Some("al".to_string())
        );
        assert_eq!(debounce.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_keystroke_restarts_timer() {
        let start = Instant::now();
        let mut debounce = SearchDebounce::default();
        debounce.input("al", start);
        debounce.input("ali", start + Duration::from_millis(200));

        assert_eq!(debounce.poll(start + Duration::from_millis(350)), None);
        assert_eq!(
            debounce.deadline(),
            Some(start + Duration::from_millis(500))
        );
        assert_eq!(
            debounce.poll(start + Duration::from_millis(500)),
            Some("ali".to_string())
        );
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debounce = SearchDebounce::new(Duration::from_millis(50));
        debounce.input("x", start);
        debounce.cancel();
        assert!(debounce.deadline().is_none());
        assert_eq!(debounce.poll(start + Duration::from_secs(1)), None);
    }
}
