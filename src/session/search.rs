use std::time::{Duration, Instant};

/// Input inactivity required before a search query is evaluated.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(150);

/// Single pending value that fires once `delay` passes without a newer
/// `schedule`. Time is supplied by the caller.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Takes the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_the_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.schedule("pl", start);

        assert_eq!(debouncer.poll(start + Duration::from_millis(149)), None);
        assert_eq!(debouncer.poll(start + SEARCH_DEBOUNCE), Some("pl"));
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn rescheduling_keeps_only_the_last_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.schedule("p", start);
        debouncer.schedule("pl", start + Duration::from_millis(100));

        assert_eq!(debouncer.poll(start + Duration::from_millis(200)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(250))
        );
        assert_eq!(debouncer.poll(start + Duration::from_millis(250)), Some("pl"));
    }

    #[test]
    fn cancel_drops_the_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.schedule(1, start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
        assert_eq!(debouncer.deadline(), None);
    }
}
