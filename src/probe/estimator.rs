//! Rate window estimation.
//!
//! Each block is mapped to the whole minute (since the first attempt) in which
//! it happened. The first block of a minute stores `round(rate * minute)`, the
//! number of requests the observed rate would have issued by then. Buckets
//! whose estimate repeats the previous surviving one are pruned, so the map
//! only keeps the points where the estimate changed.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Running "N requests per M minutes" guesses, keyed by minute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateWindowEstimate {
    buckets: BTreeMap<u64, u64>,
    seen: BTreeSet<u64>,
}

impl RateWindowEstimate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a block `elapsed` after the first attempt.
    ///
    /// Returns `(minute, estimate)` if this is the first block in that minute.
    pub fn record_block(
        &mut self,
        elapsed: Duration,
        observed_rate: Option<f64>,
    ) -> Option<(u64, u64)> {
        let minute = elapsed.as_secs() / 60;
        if !self.seen.insert(minute) {
            return None;
        }

        let estimate = observed_rate
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .map(|rate| (rate * minute as f64).round() as u64)
            .unwrap_or(0);

        self.buckets.insert(minute, estimate);
        self.buckets = prune(&self.buckets);
        Some((minute, estimate))
    }

    pub fn get(&self, minute: u64) -> Option<u64> {
        self.buckets.get(&minute).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Surviving `(minute, estimate)` pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.buckets.iter().map(|(m, c)| (*m, *c))
    }

    /// `"<count> r/<minute> min"` tokens separated by spaces.
    pub fn render(&self) -> String {
        self.iter()
            .map(|(minute, count)| format!("{} r/{} min", count, minute))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Keep only buckets whose estimate differs from the last kept one.
pub fn prune(buckets: &BTreeMap<u64, u64>) -> BTreeMap<u64, u64> {
    let mut pruned = BTreeMap::new();
    let mut last_kept: Option<u64> = None;

    for (&minute, &count) in buckets {
        if last_kept == Some(count) {
            continue;
        }
        pruned.insert(minute, count);
        last_kept = Some(count);
    }

    pruned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(m: u64, extra_secs: u64) -> Duration {
        Duration::from_secs(m * 60 + extra_secs)
    }

    #[test]
    fn test_prune_drops_repeats() {
        let buckets = BTreeMap::from([(1, 100), (2, 100), (3, 150), (4, 150)]);
        let pruned = prune(&buckets);
        assert_eq!(pruned, BTreeMap::from([(1, 100), (3, 150)]));
    }

    #[test]
    fn test_prune_keeps_returning_values() {
        let buckets = BTreeMap::from([(1, 100), (2, 150), (3, 100)]);
        assert_eq!(prune(&buckets), buckets);
    }

    #[test]
    fn test_first_block_per_minute_only() {
        let mut estimate = RateWindowEstimate::new();

        assert_eq!(estimate.record_block(minutes(2, 5), Some(10.4)), Some((2, 21)));
        assert_eq!(estimate.record_block(minutes(2, 50), Some(99.0)), None);
        assert_eq!(estimate.get(2), Some(21));
    }

    #[test]
    fn test_pruned_minute_is_not_re_estimated() {
        let mut estimate = RateWindowEstimate::new();
        estimate.record_block(minutes(1, 0), Some(100.0));
        estimate.record_block(minutes(2, 0), Some(50.0));
        assert_eq!(estimate.len(), 1, "minute 2 repeats 100 requests");

        assert_eq!(estimate.record_block(minutes(2, 30), Some(80.0)), None);
        assert_eq!(estimate.get(2), None);
    }

    #[test]
    fn test_minute_zero_estimate() {
        let mut estimate = RateWindowEstimate::new();
        assert_eq!(estimate.record_block(Duration::from_secs(59), Some(7.5)), Some((0, 0)));
        assert_eq!(estimate.render(), "0 r/0 min");
    }

    #[test]
    fn test_unknown_rate_estimates_zero() {
        let mut estimate = RateWindowEstimate::new();
        assert_eq!(estimate.record_block(minutes(3, 0), None), Some((3, 0)));
    }

    #[test]
    fn test_render() {
        let mut estimate = RateWindowEstimate::new();
        estimate.record_block(minutes(1, 0), Some(100.0));
        estimate.record_block(minutes(2, 0), Some(50.0));
        estimate.record_block(minutes(3, 0), Some(50.0));
        assert_eq!(estimate.render(), "100 r/1 min 150 r/3 min");
    }
}
