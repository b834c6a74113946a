//! Renders probe events as log lines and metrics.

use crate::observability::metrics;
use crate::probe::events::{EventSink, ProbeEvent};

/// Event sink backed by `tracing` and the metrics facade.
#[derive(Debug, Default)]
pub struct TracingSink {
    /// Last rendered window estimate, repeated on every status tick.
    guess: String,
    /// Last observed request rate.
    rate: Option<f64>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for TracingSink {
    fn emit(&mut self, event: ProbeEvent) {
        match event {
            ProbeEvent::Sleeping { delay } => {
                metrics::record_delay(delay);
                tracing::info!("Sleeping for {:.2} seconds...", delay);
            }
            ProbeEvent::Tick { remaining } => {
                tracing::trace!(
                    remaining_secs = remaining,
                    rate = self.rate.unwrap_or_default(),
                    guess = %self.guess,
                    "Cooling down"
                );
            }
            ProbeEvent::SourceIp { ip } => {
                tracing::info!(source_ip = %ip, "Source IP: {}", ip);
            }
            ProbeEvent::SourceIpUnavailable { error } => {
                tracing::warn!(error = %error, "Source IP lookup failed");
            }
            ProbeEvent::ProbeSent { sequence, url } => {
                tracing::debug!(sequence, url = %url, "Performing request {}", sequence);
            }
            ProbeEvent::Response { sequence, status } => {
                tracing::info!(sequence, status, "Received HTTP {} response from server", status);
            }
            ProbeEvent::TransportFailed { sequence, error } => {
                tracing::warn!(sequence, error = %error, "Request failed");
            }
            ProbeEvent::RateObserved { requests_per_minute } => {
                self.rate = Some(requests_per_minute);
                metrics::record_request_rate(requests_per_minute);
                tracing::debug!("Current request rate: {:.2} req/min", requests_per_minute);
            }
            ProbeEvent::Classified { sequence, outcome } => {
                metrics::record_probe(outcome.as_str());
                tracing::trace!(sequence, outcome = outcome.as_str(), "Probe classified");
            }
            ProbeEvent::Blocked {
                consecutive,
                delay,
                max_rate,
                min_delay,
            } => {
                metrics::record_consecutive_blocks(consecutive);
                tracing::warn!(
                    consecutive,
                    penalty_secs = delay,
                    max_rate = ?max_rate,
                    min_delay_secs = min_delay,
                    "Blocked by server"
                );
            }
            ProbeEvent::EstimateAdded { minutes, requests } => {
                metrics::record_window_estimate(minutes, requests);
                tracing::debug!("New guess: {} req/{} min", requests, minutes);
            }
            ProbeEvent::EstimateUpdated { summary } => {
                tracing::info!("Current guess: {}", summary);
                self.guess = summary;
            }
            ProbeEvent::BlockEnded { penalty } => {
                metrics::record_consecutive_blocks(0);
                tracing::info!(
                    penalty_secs = penalty.as_secs_f64(),
                    "Block expired, current penalty duration guess: {:.0} seconds",
                    penalty.as_secs_f64()
                );
            }
            ProbeEvent::Allowed {
                successes,
                success_rate,
                delay,
            } => {
                tracing::debug!(
                    successes,
                    success_rate = ?success_rate,
                    next_delay_secs = delay,
                    "Request allowed"
                );
            }
            ProbeEvent::Cancelled => {
                tracing::info!("Exiting...");
            }
        }
    }
}
