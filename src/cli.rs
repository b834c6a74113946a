//! Command-line interface.
//!
//! Flags override values from the optional `--config` file, which override
//! the built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{finalize, load_config, ConfigError};
use crate::config::schema::default_proxy_port;
use crate::config::validation::ValidationError;
use crate::config::{ProbeConfig, ProxyConfig};

#[derive(Debug, Parser)]
#[command(name = "rate-unlimiter", version)]
#[command(about = "Discover an endpoint's rate limit by adaptive probing", long_about = None)]
pub struct Cli {
    /// Target URL to probe
    pub url: String,

    /// Idle connections kept in the pool [default: 1]
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Per-request timeout in seconds [default: 20]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// HTTP method used for probes [default: GET]
    #[arg(long)]
    pub method: Option<String>,

    /// Seed of the cooldown ladder used after a block [default: 10]
    #[arg(long)]
    pub cooldown: Option<u32>,

    /// Penalty base numerator; blocks wait 60 * (goal / 10)^n seconds [default: 5]
    #[arg(long)]
    pub goal: Option<u32>,

    /// Forward proxy host
    #[arg(long)]
    pub proxy_host: Option<String>,

    /// Forward proxy port [default: 8080]
    #[arg(long)]
    pub proxy_port: Option<u16>,

    /// Write a debug log and dump the request history on exit
    #[arg(long)]
    pub debug: bool,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seconds to wait after the first request [default: 15]
    #[arg(long)]
    pub initial_delay: Option<f64>,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// Merge defaults, the config file and flags, then validate.
    pub fn into_config(self) -> Result<ProbeConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProbeConfig::default(),
        };
        self.apply(&mut config)?;
        finalize(config)
    }

    fn apply(self, config: &mut ProbeConfig) -> Result<(), ConfigError> {
        config.target.url = self.url;
        if let Some(method) = self.method {
            config.target.method = method.to_uppercase();
        }
        if let Some(threads) = self.threads {
            config.transport.threads = threads;
        }
        if let Some(timeout) = self.timeout {
            config.transport.timeout_secs = timeout;
        }

        match (self.proxy_host, self.proxy_port, config.transport.proxy.as_mut()) {
            (Some(host), port, existing) => {
                let port = port
                    .or(existing.map(|p| p.port))
                    .unwrap_or_else(default_proxy_port);
                config.transport.proxy = Some(ProxyConfig { host, port });
            }
            (None, Some(port), Some(existing)) => existing.port = port,
            (None, Some(_), None) => {
                return Err(ConfigError::Validation(vec![ValidationError::ProxyPortWithoutHost]));
            }
            (None, None, _) => {}
        }

        if let Some(cooldown) = self.cooldown {
            config.backoff.cooldown = cooldown;
        }
        if let Some(goal) = self.goal {
            config.backoff.goal = goal;
        }
        if let Some(initial_delay) = self.initial_delay {
            config.backoff.initial_delay_secs = initial_delay;
        }

        if self.debug {
            config.observability.debug = true;
        }
        if let Some(addr) = self.metrics_address {
            config.observability.metrics_address = Some(addr);
        }
        Ok(())
    }
}
