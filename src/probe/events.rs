//! Structured events emitted by the probe loop.
//!
//! The loop never formats output itself. Sinks decide how events are logged,
//! counted or displayed.

use std::time::Duration;

use crate::probe::classifier::Outcome;

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeEvent {
    /// A cooldown of `delay` seconds begins.
    Sleeping { delay: f64 },

    /// Once per second of cooldown, plus once for the final fraction.
    Tick { remaining: f64 },

    /// Apparent source address reported by the IP echo service.
    SourceIp { ip: String },

    /// The IP echo lookup failed.
    SourceIpUnavailable { error: String },

    /// A probe is about to be sent.
    ProbeSent { sequence: u64, url: String },

    /// A probe got an HTTP response.
    Response { sequence: u64, status: u16 },

    /// A probe failed below the HTTP level.
    TransportFailed { sequence: u64, error: String },

    /// Requests per minute over the whole session.
    RateObserved { requests_per_minute: f64 },

    /// Outcome of a steady-state probe.
    Classified { sequence: u64, outcome: Outcome },

    /// A blocked probe and the resulting backoff.
    Blocked {
        consecutive: u32,
        delay: f64,
        max_rate: Option<u64>,
        min_delay: f64,
    },

    /// First block within a new minute bucket.
    EstimateAdded { minutes: u64, requests: u64 },

    /// Current rate window estimate, rendered.
    EstimateUpdated { summary: String },

    /// The first allowed probe after a block.
    BlockEnded { penalty: Duration },

    /// An allowed probe.
    Allowed {
        successes: u64,
        success_rate: Option<f64>,
        delay: f64,
    },

    /// The session stopped on request.
    Cancelled,
}

/// Receiver of probe events.
pub trait EventSink {
    fn emit(&mut self, event: ProbeEvent);
}

/// Collects events in memory.
impl EventSink for Vec<ProbeEvent> {
    fn emit(&mut self, event: ProbeEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: ProbeEvent) {
        (**self).emit(event);
    }
}
