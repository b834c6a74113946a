//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     first SIGTERM/SIGINT → Shutdown::trigger
//!     second SIGTERM/SIGINT → process exit (status 130)
//!
//! Shutdown (shutdown.rs):
//!     ProbeLoop cooldown observes the trigger
//!     → loop returns its report
//!     → main writes the debug dump (if enabled) and exits 0
//! ```
//!
//! # Design Decisions
//! - No work happens inside the signal handler
//! - An in-flight request is never aborted

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
