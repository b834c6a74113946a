//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ProbeLoop emits ProbeEvent:
//!     → sink.rs (TracingSink)
//!         → logging.rs (stderr + optional rotating debug file)
//!         → metrics.rs (counters and gauges, optional Prometheus endpoint)
//! ```
//!
//! # Design Decisions
//! - The probe loop never formats output; sinks decide presentation
//! - Structured fields on every log line for machine parsing
//! - Debug file output is size-capped with a single backup

pub mod logging;
pub mod metrics;
pub mod sink;

pub use sink::TracingSink;
