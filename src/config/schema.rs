//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a probe session.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the rate unlimiter.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProbeConfig {
    /// Endpoint under test.
    pub target: TargetConfig,

    /// HTTP client settings.
    pub transport: TransportConfig,

    /// Delay schedule tuning.
    pub backoff: BackoffConfig,

    /// Logging, dump and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Target endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Target URL (e.g., "https://api.example.com/v1/items").
    pub url: String,

    /// HTTP method used for every probe.
    pub method: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: "GET".to_string(),
        }
    }
}

/// Transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Idle connections kept warm per host. Probes are still issued one at a time.
    pub threads: usize,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Optional forward proxy.
    pub proxy: Option<ProxyConfig>,

    /// Service that echoes the caller's IP, queried when a proxy is set.
    pub ip_echo_url: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            timeout_secs: 20,
            proxy: None,
            ip_echo_url: "http://ipinfo.io/ip".to_string(),
        }
    }
}

/// Forward proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,

    #[serde(default = "default_proxy_port")]
    pub port: u16,
}

impl ProxyConfig {
    /// Proxy URL as understood by the HTTP client.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

pub(crate) fn default_proxy_port() -> u16 {
    8080
}

/// Delay schedule configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Seed of the cooldown ladder used when a block ends.
    pub cooldown: u32,

    /// Numerator of the penalty base (`goal / 10`).
    pub goal: u32,

    /// Pause between the bootstrap probe and the first steady probe, in seconds.
    pub initial_delay_secs: f64,

    /// Delay floor before any block has been observed, in seconds.
    pub initial_min_delay_secs: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            cooldown: 10,
            goal: 5,
            initial_delay_secs: 15.0,
            initial_min_delay_secs: 0.5,
        }
    }
}

impl BackoffConfig {
    /// Base of the exponential block penalty.
    pub fn penalty_base(&self) -> f64 {
        self.goal as f64 / 10.0
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level for stderr output (trace, debug, info, warn, error).
    pub log_level: String,

    /// Verbose file logging and a request dump on exit.
    pub debug: bool,

    /// Debug log file path.
    pub log_file: String,

    /// Size at which the debug log rotates, in bytes.
    pub log_max_bytes: u64,

    /// Request history dump path, written on exit in debug mode.
    pub dump_path: String,

    /// Prometheus scrape listener (e.g., "127.0.0.1:9090"). Disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug: false,
            log_file: "debug.log".to_string(),
            log_max_bytes: 2 * 1024 * 1024, // 2MB
            dump_path: "debug_requests.json".to_string(),
            metrics_address: None,
        }
    }
}
