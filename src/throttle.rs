//! Per-job query throttling.
//!
//! The remote task API does not appreciate being polled aggressively, so
//! status queries for the same job must be at least `min_interval` apart.
//! The guard is the only state shared across concurrent tool invocations.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a throttle check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrottleDecision {
    /// The query may proceed; the guard recorded it as the new baseline.
    Allowed,
    /// Too soon. `wait` is the remaining time until the window reopens.
    /// The baseline is left untouched, so a denied caller does not push the
    /// window further out.
    Denied { wait: Duration },
}

/// Tracks the last accepted query time per job identifier.
///
/// Entries are never evicted; the map grows by one `(String, Instant)` per
/// distinct job queried during the process lifetime. Throttle state does not
/// survive restarts — the first query after a restart is always allowed.
pub struct ThrottleGuard {
    min_interval: Duration,
    last_query: Mutex<HashMap<String, Instant>>,
}

impl ThrottleGuard {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_query: Mutex::new(HashMap::new()),
        }
    }

    /// Atomically check the window for `job_id` and, if open, record `now`
    /// as the new baseline.
    ///
    /// Check and record are one critical section: of several concurrent
    /// callers for the same id, exactly one is allowed per interval. Never
    /// blocks beyond the O(1) map access.
    pub fn check_and_record(&self, job_id: &str) -> ThrottleDecision {
        self.check_and_record_at(job_id, Instant::now())
    }

    /// `check_and_record` with an explicit clock, for tests.
    pub fn check_and_record_at(&self, job_id: &str, now: Instant) -> ThrottleDecision {
        let mut map = self.last_query.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(&last) = map.get(job_id) {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_interval {
                return ThrottleDecision::Denied {
                    wait: self.min_interval - elapsed,
                };
            }
        }

        map.insert(job_id.to_string(), now);
        ThrottleDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const INTERVAL: Duration = Duration::from_secs(15);

    #[test]
    fn first_query_is_always_allowed() {
        let guard = ThrottleGuard::new(INTERVAL);
        assert_eq!(guard.check_and_record("cgt-a"), ThrottleDecision::Allowed);
    }

    #[test]
    fn second_query_within_window_is_denied_with_remaining_wait() {
        let guard = ThrottleGuard::new(INTERVAL);
        let t0 = Instant::now();
        assert_eq!(guard.check_and_record_at("cgt-a", t0), ThrottleDecision::Allowed);

        match guard.check_and_record_at("cgt-a", t0 + Duration::from_secs(13)) {
            ThrottleDecision::Denied { wait } => assert_eq!(wait, Duration::from_secs(2)),
            other => panic!("expected Denied, got {other:?}"),
        }
    }

    #[test]
    fn denied_query_does_not_reset_the_window() {
        let guard = ThrottleGuard::new(INTERVAL);
        let t0 = Instant::now();
        guard.check_and_record_at("cgt-a", t0);

        // Denied at t0+10; the baseline must still be t0, so t0+15 is open.
        assert!(matches!(
            guard.check_and_record_at("cgt-a", t0 + Duration::from_secs(10)),
            ThrottleDecision::Denied { .. }
        ));
        assert_eq!(
            guard.check_and_record_at("cgt-a", t0 + INTERVAL),
            ThrottleDecision::Allowed
        );
    }

    #[test]
    fn allowed_query_becomes_the_new_baseline() {
        let guard = ThrottleGuard::new(INTERVAL);
        let t0 = Instant::now();
        guard.check_and_record_at("cgt-a", t0);
        assert_eq!(
            guard.check_and_record_at("cgt-a", t0 + Duration::from_secs(20)),
            ThrottleDecision::Allowed
        );
        // 14s after the second accepted query, not the first.
        assert!(matches!(
            guard.check_and_record_at("cgt-a", t0 + Duration::from_secs(34)),
            ThrottleDecision::Denied { .. }
        ));
    }

    #[test]
    fn jobs_are_throttled_independently() {
        let guard = ThrottleGuard::new(INTERVAL);
        let t0 = Instant::now();
        assert_eq!(guard.check_and_record_at("cgt-a", t0), ThrottleDecision::Allowed);
        assert_eq!(guard.check_and_record_at("cgt-b", t0), ThrottleDecision::Allowed);
        assert!(matches!(
            guard.check_and_record_at("cgt-a", t0 + Duration::from_secs(1)),
            ThrottleDecision::Denied { .. }
        ));
        assert_eq!(
            guard.check_and_record_at("cgt-c", t0 + Duration::from_secs(1)),
            ThrottleDecision::Allowed
        );
    }

    #[test]
    fn exactly_one_concurrent_caller_wins() {
        let guard = Arc::new(ThrottleGuard::new(INTERVAL));
        let now = Instant::now();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let guard = Arc::clone(&guard);
                std::thread::spawn(move || guard.check_and_record_at("cgt-race", now))
            })
            .collect();

        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|d| *d == ThrottleDecision::Allowed)
            .count();
        assert_eq!(allowed, 1);
    }
}
