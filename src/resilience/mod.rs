//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Probe outcome:
//!     → Allowed: backoff.rs decays the delay toward the current floor
//!     → Blocked: backoff.rs imposes the penalty for the episode length
//!     → Block ended: backoff.rs picks a cooldown rung, then decays it
//! ```
//!
//! # Design Decisions
//! - Pure functions of (delay, floor, counts); state lives in the probe loop
//! - Decay changes the implied rate additively, one request per minute per step
//! - The floor is only lowered or raised when a new block episode starts

pub mod backoff;

pub use backoff::{next_delay, penalty_delay, CooldownLadder};
