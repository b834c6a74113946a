//! reqwest-backed transport.
//!
//! # Responsibilities
//! - Build a client with the configured timeout, pool size and proxy
//! - Map reqwest failures onto `TransportError`

use std::time::Duration;

use reqwest::{Client, Method, Proxy};

use crate::config::TransportConfig;
use crate::transport::{ProbeResponse, Transport, TransportError};

const USER_AGENT: &str = concat!("rate-unlimiter/", env!("CARGO_PKG_VERSION"));

/// HTTP transport with an optional forward proxy.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout_secs: u64,
}

impl HttpTransport {
    /// Create a transport from configuration.
    ///
    /// Environment proxy variables are ignored; only the configured proxy is used.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.threads)
            .user_agent(USER_AGENT);

        builder = match &config.proxy {
            Some(proxy) => {
                let proxy_url = proxy.url();
                let proxy = Proxy::all(&proxy_url).map_err(|e| {
                    TransportError::Build(format!("invalid proxy '{}': {}", proxy_url, e))
                })?;
                tracing::info!(proxy = %proxy_url, "Routing probes through forward proxy");
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        let client = builder
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        tracing::debug!(
            pool_size = config.threads,
            timeout_secs = config.timeout_secs,
            "HTTP transport initialized"
        );

        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout_secs)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Protocol(err.to_string())
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, method: &Method, url: &str) -> Result<ProbeResponse, TransportError> {
        let response = self
            .client
            .request(method.clone(), url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        Ok(ProbeResponse { status, body })
    }
}
