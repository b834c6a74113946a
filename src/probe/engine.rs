//! The probe loop.
//!
//! # Responsibilities
//! - Issue the bootstrap probe and reject unusable targets
//! - Sleep, probe, classify, update backoff and estimate, repeat
//! - Stop cleanly on shutdown, before the next probe is sent
//!
//! # State Machine
//! ```text
//! Bootstrapping ──ok──▶ Cooling ⇄ Requesting
//!       │                  │
//!       └─fatal─▶ Err      └─shutdown─▶ Ok(ProbeReport)
//! ```

use std::time::Duration;

use reqwest::Method;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::{sleep, Instant};
use url::Url;

use crate::config::loader::ConfigError;
use crate::config::validation::ValidationError;
use crate::config::ProbeConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::probe::classifier::{check_bootstrap, classify, Outcome};
use crate::probe::estimator::RateWindowEstimate;
use crate::probe::events::{EventSink, ProbeEvent};
use crate::probe::history::ProbeHistory;
use crate::probe::state::BackoffState;
use crate::resilience::CooldownLadder;
use crate::transport::Transport;

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Bootstrapping,
    Cooling,
    Requesting,
}

/// How a cooldown finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cooldown {
    Elapsed,
    Cancelled,
}

/// Running totals across the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeCounters {
    pub total: u64,
    pub success: u64,
}

/// Everything the loop learned, handed back when it stops.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub history: ProbeHistory,
    pub estimate: RateWindowEstimate,
    pub backoff: BackoffState,
    pub counters: ProbeCounters,
}

/// Adaptive prober for a single target.
pub struct ProbeLoop<T, S> {
    transport: T,
    sink: S,
    method: Method,
    target: Url,
    ip_echo_url: Option<String>,
    penalty_base: f64,
    ladder: CooldownLadder,
    phase: Phase,
    history: ProbeHistory,
    backoff: BackoffState,
    estimate: RateWindowEstimate,
    counters: ProbeCounters,
    success_streak: u64,
}

impl<T: Transport, S: EventSink> ProbeLoop<T, S> {
    /// Create a loop from a validated configuration.
    pub fn new(config: &ProbeConfig, transport: T, sink: S) -> ProbeResult<Self> {
        let invalid = |e: ValidationError| ProbeError::Config(ConfigError::Validation(vec![e]));

        let method = Method::from_bytes(config.target.method.as_bytes())
            .map_err(|_| invalid(ValidationError::InvalidMethod(config.target.method.clone())))?;
        let target = Url::parse(&config.target.url).map_err(|e| {
            invalid(ValidationError::InvalidUrl {
                url: config.target.url.clone(),
                reason: e.to_string(),
            })
        })?;
        let ladder = CooldownLadder::new(config.backoff.cooldown)
            .ok_or_else(|| invalid(ValidationError::CooldownTooSmall(config.backoff.cooldown)))?;

        let ip_echo_url = config
            .transport
            .proxy
            .as_ref()
            .map(|_| config.transport.ip_echo_url.clone());

        Ok(Self {
            transport,
            sink,
            method,
            target,
            ip_echo_url,
            penalty_base: config.backoff.penalty_base(),
            ladder,
            phase: Phase::Bootstrapping,
            history: ProbeHistory::new(Instant::now()),
            backoff: BackoffState::new(
                config.backoff.initial_delay_secs,
                config.backoff.initial_min_delay_secs,
            ),
            estimate: RateWindowEstimate::new(),
            counters: ProbeCounters::default(),
            success_streak: 0,
        })
    }

    /// Bootstrap, then probe until `shutdown` fires.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> ProbeResult<ProbeReport> {
        self.bootstrap().await?;

        loop {
            if self.cool_down(&mut shutdown).await == Cooldown::Cancelled {
                break;
            }
            self.step().await;
        }

        self.sink.emit(ProbeEvent::Cancelled);
        Ok(self.into_report())
    }

    /// Send the first, unsuffixed probe and establish the baseline.
    pub async fn bootstrap(&mut self) -> ProbeResult<()> {
        self.phase = Phase::Bootstrapping;
        self.report_source_ip().await;

        self.counters.total += 1;
        let sequence = self.counters.total;
        self.sink.emit(ProbeEvent::ProbeSent {
            sequence,
            url: self.target.to_string(),
        });

        let result = self.transport.send(&self.method, self.target.as_str()).await;
        let now = Instant::now();
        self.history.record_attempt(sequence, now);

        let response = result.map_err(ProbeError::Bootstrap)?;
        self.sink.emit(ProbeEvent::Response {
            sequence,
            status: response.status,
        });
        check_bootstrap(response.status)?;

        self.counters.success += 1;
        self.success_streak = 1;
        self.history.record_success(self.success_streak, now);
        self.phase = Phase::Cooling;
        Ok(())
    }

    /// Wait out the current delay in steps of at most one second.
    pub async fn cool_down(&mut self, shutdown: &mut broadcast::Receiver<()>) -> Cooldown {
        self.phase = Phase::Cooling;
        if !matches!(shutdown.try_recv(), Err(TryRecvError::Empty)) {
            return Cooldown::Cancelled;
        }

        let mut remaining = self.backoff.current_delay;
        self.sink.emit(ProbeEvent::Sleeping { delay: remaining });

        while remaining > 0.0 {
            self.sink.emit(ProbeEvent::Tick { remaining });
            let step = Duration::from_secs_f64(remaining.min(1.0));
            tokio::select! {
                _ = sleep(step) => {}
                _ = shutdown.recv() => return Cooldown::Cancelled,
            }
            remaining -= 1.0;
        }

        Cooldown::Elapsed
    }

    /// Issue one steady-state probe and fold its outcome into the state.
    pub async fn step(&mut self) -> Outcome {
        self.phase = Phase::Requesting;
        self.report_source_ip().await;

        self.counters.total += 1;
        let sequence = self.counters.total;
        let url = probe_url(&self.target, sequence);
        self.sink.emit(ProbeEvent::ProbeSent {
            sequence,
            url: url.to_string(),
        });

        let result = self.transport.send(&self.method, url.as_str()).await;
        let now = Instant::now();
        self.history.record_attempt(sequence, now);

        match &result {
            Ok(response) => self.sink.emit(ProbeEvent::Response {
                sequence,
                status: response.status,
            }),
            Err(e) => self.sink.emit(ProbeEvent::TransportFailed {
                sequence,
                error: e.to_string(),
            }),
        }

        let rate = self.history.observed_rate();
        if let Some(requests_per_minute) = rate {
            self.sink
                .emit(ProbeEvent::RateObserved { requests_per_minute });
        }

        let outcome = classify(&result);
        self.sink.emit(ProbeEvent::Classified { sequence, outcome });
        if outcome.is_blocked() {
            self.on_blocked(now, rate);
        } else {
            self.on_allowed(now);
        }

        self.phase = Phase::Cooling;
        outcome
    }

    fn on_blocked(&mut self, now: Instant, rate: Option<f64>) {
        self.success_streak = 0;
        if self.backoff.on_blocked(rate, now, self.penalty_base) {
            self.history.clear_successes();
        }
        self.history
            .record_failure(self.backoff.consecutive_fail_count, now);

        let elapsed = self.history.since_first_attempt(now);
        if let Some((minutes, requests)) = self.estimate.record_block(elapsed, rate) {
            self.sink.emit(ProbeEvent::EstimateAdded { minutes, requests });
        }
        self.sink.emit(ProbeEvent::EstimateUpdated {
            summary: self.estimate.render(),
        });

        self.sink.emit(ProbeEvent::Blocked {
            consecutive: self.backoff.consecutive_fail_count,
            delay: self.backoff.current_delay,
            max_rate: self.backoff.max_rate_estimate,
            min_delay: self.backoff.min_delay,
        });
    }

    fn on_allowed(&mut self, now: Instant) {
        self.counters.success += 1;
        self.success_streak += 1;
        self.history.record_success(self.success_streak, now);

        if let Some(penalty) = self.backoff.on_allowed(now, &self.ladder) {
            self.sink.emit(ProbeEvent::BlockEnded { penalty });
        }

        self.sink.emit(ProbeEvent::Allowed {
            successes: self.counters.success,
            success_rate: self.history.success_rate(),
            delay: self.backoff.current_delay,
        });
    }

    async fn report_source_ip(&mut self) {
        let Some(url) = self.ip_echo_url.as_deref() else {
            return;
        };

        let event = match self.transport.send(&Method::GET, url).await {
            Ok(response) => ProbeEvent::SourceIp {
                ip: response.body.trim().to_string(),
            },
            Err(e) => ProbeEvent::SourceIpUnavailable {
                error: e.to_string(),
            },
        };
        self.sink.emit(event);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn history(&self) -> &ProbeHistory {
        &self.history
    }

    pub fn backoff(&self) -> &BackoffState {
        &self.backoff
    }

    pub fn estimate(&self) -> &RateWindowEstimate {
        &self.estimate
    }

    pub fn counters(&self) -> ProbeCounters {
        self.counters
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_report(self) -> ProbeReport {
        ProbeReport {
            history: self.history,
            estimate: self.estimate,
            backoff: self.backoff,
            counters: self.counters,
        }
    }
}

/// Target URL with the sequence number appended to the query string.
pub fn probe_url(target: &Url, sequence: u64) -> Url {
    let mut url = target.clone();
    let query = match target.query() {
        Some(existing) if !existing.is_empty() => format!("{}&{}", existing, sequence),
        _ => sequence.to_string(),
    };
    url.set_query(Some(&query));
    url
}
