//! Rate Unlimiter
//!
//! Probes an HTTP endpoint one request at a time to discover its rate limit.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────┐
//!   │                         PROBE LOOP                             │
//!   │                                                                │
//!   │  ┌──────────┐   ┌───────────┐   ┌────────────┐                 │
//!   │  │ cooldown │──▶│ transport │──▶│ classifier │                 │
//!   │  │  (sleep) │   │ (reqwest) │   │ allow/block│                 │
//!   │  └────▲─────┘   └───────────┘   └─────┬──────┘                 │
//!   │       │                               │                        │
//!   │       │        ┌──────────────┐       ▼                        │
//!   │       └────────│   backoff    │◀──────┤                        │
//!   │    next delay  │ decay/penalty│       │                        │
//!   │                └──────────────┘       ▼                        │
//!   │                              ┌─────────────────┐               │
//!   │                              │ window estimate │               │
//!   │                              └─────────────────┘               │
//!   │                                                                │
//!   │  Cross-cutting: config · observability · lifecycle (signals)   │
//!   └───────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use clap::Parser;

use rate_unlimiter::cli::Cli;
use rate_unlimiter::lifecycle::{signals, Shutdown};
use rate_unlimiter::observability::{logging, metrics, TracingSink};
use rate_unlimiter::probe::{DebugDump, ProbeLoop};
use rate_unlimiter::transport::HttpTransport;
use rate_unlimiter::ProbeError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            let e = ProbeError::from(e);
            eprintln!("rate-unlimiter: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    logging::init_logging(&config.observability)?;
    tracing::info!("Initializing...");

    tracing::info!(
        url = %config.target.url,
        method = %config.target.method,
        cooldown = config.backoff.cooldown,
        goal = config.backoff.goal,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        metrics::init_metrics(addr.parse()?)?;
    }

    let shutdown = Shutdown::new();
    let probe_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown.clone());

    tracing::debug!("Initializing connection pool...");
    let transport = HttpTransport::new(&config.transport)?;
    let probe = ProbeLoop::new(&config, transport, TracingSink::new())?;

    let report = match probe.run(probe_shutdown).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Probing aborted");
            std::process::exit(e.exit_code());
        }
    };

    tracing::info!(
        requests = report.counters.total,
        successes = report.counters.success,
        guess = %report.estimate.render(),
        "Probe session finished"
    );

    if config.observability.debug {
        let path = Path::new(&config.observability.dump_path);
        DebugDump::from_history(&report.history).write_to(path)?;
    }

    Ok(())
}
