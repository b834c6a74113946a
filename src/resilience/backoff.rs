//! Delay schedule: decay toward a floor, block penalties and the cooldown ladder.
//!
//! Delays are expressed in seconds as `f64`. A delay `d` implies a request
//! rate of `60 / d` requests per minute; decay raises that implied rate by one
//! request per minute per call.

/// Decay a delay one step toward `min_delay`.
///
/// `60 / ((60 / delay) + 1)`, never below `min_delay`. A zero delay decays
/// straight to the floor.
pub fn next_delay(delay: f64, min_delay: f64) -> f64 {
    let decayed = 60.0 / ((60.0 / delay) + 1.0);
    if decayed.is_nan() || decayed < min_delay {
        min_delay
    } else {
        decayed
    }
}

/// Delay imposed after the `consecutive_fails`-th block of an episode.
///
/// `60 * base^consecutive_fails`. With `base < 1` the penalty shrinks as the
/// episode grows; the schedule is kept literal.
pub fn penalty_delay(penalty_base: f64, consecutive_fails: u32) -> f64 {
    60.0 * penalty_base.powi(consecutive_fails as i32)
}

/// Recovery delays used on the first allowed probe after a block.
#[derive(Debug, Clone, PartialEq)]
pub struct CooldownLadder {
    /// Ascending rungs, e.g. `[2, 4, 6, 8, 10]` for a cooldown of 10.
    rungs: Vec<f64>,
}

impl CooldownLadder {
    /// Build the ladder `cooldown, cooldown - 2, ...` (values > 1), reversed.
    ///
    /// Returns `None` when the seed yields no rungs (`cooldown < 2`).
    pub fn new(cooldown: u32) -> Option<Self> {
        let mut rungs: Vec<f64> = descending_offsets(cooldown).map(f64::from).collect();
        if rungs.is_empty() {
            return None;
        }
        rungs.reverse();
        Some(Self { rungs })
    }

    /// Rung for a fail count, clamped to the top of the ladder.
    pub fn delay_for(&self, consecutive_fails: u32) -> f64 {
        let idx = (consecutive_fails as usize).min(self.rungs.len() - 1);
        self.rungs[idx]
    }

    pub fn rungs(&self) -> &[f64] {
        &self.rungs
    }
}

fn descending_offsets(cooldown: u32) -> impl Iterator<Item = u32> {
    (2..=cooldown).rev().step_by(2)
}
