//! HTTP transport used by the probe loop.
//!
//! # Data Flow
//! ```text
//! ProbeLoop
//!     → Transport::send(method, url)
//!     → client.rs (reqwest, optional forward proxy, per-request timeout)
//!     → ProbeResponse { status, body } | TransportError
//! ```
//!
//! # Design Decisions
//! - One request at a time; the pool size only controls warm idle connections
//! - Transport failures are values, classified by the caller
//! - The loop is generic over `Transport` so it can be driven by scripted outcomes

pub mod client;

use std::future::Future;

use reqwest::Method;
use thiserror::Error;

pub use client::HttpTransport;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: String,
}

impl ProbeResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Errors raised below the HTTP status level.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The connection broke or the response was malformed.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

/// Something that can issue one request and report its outcome.
pub trait Transport {
    fn send(
        &self,
        method: &Method,
        url: &str,
    ) -> impl Future<Output = Result<ProbeResponse, TransportError>> + Send;
}
