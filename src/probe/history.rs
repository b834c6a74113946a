//! Time series recorded during a probe session.
//!
//! Timestamps are monotonic. For export they are converted to seconds since
//! the session origin.

use std::time::Duration;

use tokio::time::Instant;

/// One issued request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeAttempt {
    pub sequence: u64,
    pub timestamp: Instant,
}

/// An allowed probe, indexed within the current run of successes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuccessRecord {
    pub timestamp: Instant,
    pub index: u64,
    pub weight: u32,
}

/// A blocked probe, indexed within its episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailRecord {
    pub timestamp: Instant,
    pub consecutive_index: u32,
    pub weight: u32,
}

/// Attempt, success and failure histories of one session.
#[derive(Debug, Clone)]
pub struct ProbeHistory {
    origin: Instant,
    attempts: Vec<ProbeAttempt>,
    successes: Vec<SuccessRecord>,
    failures: Vec<FailRecord>,
}

impl ProbeHistory {
    pub fn new(origin: Instant) -> Self {
        Self {
            origin,
            attempts: Vec::new(),
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record_attempt(&mut self, sequence: u64, timestamp: Instant) {
        self.attempts.push(ProbeAttempt {
            sequence,
            timestamp,
        });
    }

    pub fn record_success(&mut self, index: u64, timestamp: Instant) {
        self.successes.push(SuccessRecord {
            timestamp,
            index,
            weight: 1,
        });
    }

    pub fn record_failure(&mut self, consecutive_index: u32, timestamp: Instant) {
        self.failures.push(FailRecord {
            timestamp,
            consecutive_index,
            weight: 1,
        });
    }

    /// Forget the success run; called when a block episode starts.
    pub fn clear_successes(&mut self) {
        self.successes.clear();
    }

    pub fn attempts(&self) -> &[ProbeAttempt] {
        &self.attempts
    }

    pub fn successes(&self) -> &[SuccessRecord] {
        &self.successes
    }

    pub fn failures(&self) -> &[FailRecord] {
        &self.failures
    }

    pub fn first_attempt(&self) -> Option<Instant> {
        self.attempts.first().map(|a| a.timestamp)
    }

    /// Time from the first attempt to `at`, zero before any attempt.
    pub fn since_first_attempt(&self, at: Instant) -> Duration {
        self.first_attempt()
            .map(|first| at.saturating_duration_since(first))
            .unwrap_or(Duration::ZERO)
    }

    /// Requests per minute over the whole attempt history.
    pub fn observed_rate(&self) -> Option<f64> {
        per_minute(
            self.attempts.len(),
            self.attempts.first().map(|a| a.timestamp),
            self.attempts.last().map(|a| a.timestamp),
        )
    }

    /// Allowed requests per minute over the current success run.
    pub fn success_rate(&self) -> Option<f64> {
        per_minute(
            self.successes.len(),
            self.successes.first().map(|s| s.timestamp),
            self.successes.last().map(|s| s.timestamp),
        )
    }

    /// Seconds since the session origin.
    pub fn offset_secs(&self, at: Instant) -> f64 {
        at.saturating_duration_since(self.origin).as_secs_f64()
    }
}

fn per_minute(count: usize, first: Option<Instant>, last: Option<Instant>) -> Option<f64> {
    if count < 2 {
        return None;
    }
    let span = last?.saturating_duration_since(first?).as_secs_f64();
    if span <= 0.0 {
        return None;
    }
    Some(count as f64 / span * 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_needs_two_attempts() {
        let origin = Instant::now();
        let mut history = ProbeHistory::new(origin);
        assert_eq!(history.observed_rate(), None);

        history.record_attempt(1, origin);
        assert_eq!(history.observed_rate(), None);

        history.record_attempt(2, origin + Duration::from_secs(30));
        // 2 requests over 30s
        assert_eq!(history.observed_rate(), Some(4.0));
    }

    #[test]
    fn test_rate_with_zero_span() {
        let origin = Instant::now();
        let mut history = ProbeHistory::new(origin);
        history.record_attempt(1, origin);
        history.record_attempt(2, origin);
        assert_eq!(history.observed_rate(), None);
    }

    #[test]
    fn test_success_run_is_cleared() {
        let origin = Instant::now();
        let mut history = ProbeHistory::new(origin);
        history.record_success(1, origin);
        history.record_success(2, origin + Duration::from_secs(6));
        assert_eq!(history.success_rate(), Some(20.0));

        history.clear_successes();
        assert!(history.successes().is_empty());
        assert_eq!(history.success_rate(), None);
    }

    #[test]
    fn test_failures_keep_episode_index() {
        let origin = Instant::now();
        let mut history = ProbeHistory::new(origin);
        history.record_failure(1, origin + Duration::from_secs(1));
        history.record_failure(2, origin + Duration::from_secs(2));

        let indexes: Vec<u32> = history.failures().iter().map(|f| f.consecutive_index).collect();
        assert_eq!(indexes, vec![1, 2]);
        assert!(history.failures().iter().all(|f| f.weight == 1));
    }

    #[test]
    fn test_since_first_attempt() {
        let origin = Instant::now();
        let mut history = ProbeHistory::new(origin);
        assert_eq!(history.since_first_attempt(origin), Duration::ZERO);

        history.record_attempt(1, origin + Duration::from_secs(5));
        assert_eq!(
            history.since_first_attempt(origin + Duration::from_secs(125)),
            Duration::from_secs(120)
        );
        assert_eq!(history.offset_secs(origin + Duration::from_millis(1500)), 1.5);
    }
}
