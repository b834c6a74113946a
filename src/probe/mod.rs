//! Adaptive probing subsystem.
//!
//! # Data Flow
//! ```text
//! engine.rs (ProbeLoop)
//!     → Transport::send
//!     → classifier.rs (Allowed | Blocked)
//!     → state.rs (BackoffState: floor, penalty, cooldown, decay)
//!     → estimator.rs (RateWindowEstimate per elapsed minute)
//!     → history.rs (attempt / success / failure series)
//!     → events.rs (ProbeEvent to an EventSink)
//! ```
//!
//! # Design Decisions
//! - One probe in flight at a time; all state is owned by the loop
//! - Blocks are signal, not errors; only bootstrap problems are fatal
//! - Shutdown is observed between probes, never mid-request

pub mod classifier;
pub mod dump;
pub mod engine;
pub mod estimator;
pub mod events;
pub mod history;
pub mod state;

pub use classifier::{classify, Outcome};
pub use dump::DebugDump;
pub use engine::{ProbeLoop, ProbeReport};
pub use estimator::RateWindowEstimate;
pub use events::{EventSink, ProbeEvent};
pub use history::ProbeHistory;
pub use state::BackoffState;
