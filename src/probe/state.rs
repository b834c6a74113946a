//! Backoff state machine.
//!
//! # State Transitions
//! ```text
//! Clear → Blocked(1):   first block; freeze rate ceiling and delay floor
//! Blocked(n) → Blocked(n+1): penalty delay for n+1 consecutive blocks
//! Blocked(n) → Clear:   first allowed probe; cooldown rung, then decay
//! Clear → Clear:        decay toward the floor
//! ```

use std::time::Duration;

use tokio::time::Instant;

use crate::resilience::{next_delay, penalty_delay, CooldownLadder};

/// Delay bookkeeping owned by the probe loop.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffState {
    /// Seconds to wait before the next probe.
    pub current_delay: f64,
    /// Floor for decay, derived from the rate ceiling.
    pub min_delay: f64,
    /// Requests per minute that triggered the latest episode. `None` until the first block.
    pub max_rate_estimate: Option<u64>,
    /// Blocks in the current episode.
    pub consecutive_fail_count: u32,
    /// Start of the current episode.
    pub block_start: Option<Instant>,
}

impl BackoffState {
    pub fn new(initial_delay: f64, initial_min_delay: f64) -> Self {
        Self {
            current_delay: initial_delay,
            min_delay: initial_min_delay,
            max_rate_estimate: None,
            consecutive_fail_count: 0,
            block_start: None,
        }
    }

    pub fn in_block(&self) -> bool {
        self.consecutive_fail_count > 0
    }

    /// Apply a blocked outcome. Returns true if it opened a new episode.
    ///
    /// On a new episode the rate ceiling becomes `ceil(observed_rate)` and the
    /// floor `60 / ceiling`; without a usable rate both keep their values.
    pub fn on_blocked(
        &mut self,
        observed_rate: Option<f64>,
        now: Instant,
        penalty_base: f64,
    ) -> bool {
        let fresh = !self.in_block();
        if fresh {
            if let Some(rate) = observed_rate.filter(|r| r.is_finite() && *r > 0.0) {
                let ceiling = rate.ceil() as u64;
                self.max_rate_estimate = Some(ceiling);
                self.min_delay = 60.0 / ceiling as f64;
            }
            self.block_start = Some(now);
        }

        self.consecutive_fail_count += 1;
        self.current_delay = penalty_delay(penalty_base, self.consecutive_fail_count);
        fresh
    }

    /// Apply an allowed outcome.
    ///
    /// Returns how long the block lasted if this outcome ended one.
    pub fn on_allowed(&mut self, now: Instant, ladder: &CooldownLadder) -> Option<Duration> {
        let mut penalty = None;
        if self.in_block() {
            penalty = self.block_start.take().map(|start| now.saturating_duration_since(start));
            self.consecutive_fail_count = 0;
            self.current_delay = ladder.delay_for(self.consecutive_fail_count);
        }

        self.current_delay = next_delay(self.current_delay, self.min_delay);
        penalty
    }
}
