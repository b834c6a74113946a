//! Fatal errors surfaced to the operator.
//!
//! Steady-state probe failures never appear here; they are outcomes the probe
//! loop interprets. Only bootstrap, configuration and setup problems end a run.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The very first request was already answered with 429.
    #[error("Already rate-limited")]
    AlreadyRateLimited,

    /// The very first request was answered with 405.
    #[error("Invalid method: Server returned HTTP 405")]
    InvalidMethod,

    /// The very first request did not complete.
    #[error("Initial request failed: {0}")]
    Bootstrap(#[source] TransportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode request dump: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Metrics setup failed: {0}")]
    Metrics(String),
}

impl ProbeError {
    /// Process exit status for this error.
    ///
    /// Configuration problems exit with 2, everything else with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProbeError::Config(_) => 2,
            _ => 1,
        }
    }
}

/// Result type for probe sessions.
pub type ProbeResult<T> = Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ProbeError::AlreadyRateLimited.to_string(), "Already rate-limited");
        assert_eq!(
            ProbeError::InvalidMethod.to_string(),
            "Invalid method: Server returned HTTP 405"
        );

        let err = ProbeError::Bootstrap(TransportError::Timeout(20));
        assert_eq!(
            err.to_string(),
            "Initial request failed: request timed out after 20 seconds"
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ProbeError::AlreadyRateLimited.exit_code(), 1);
        assert_eq!(ProbeError::InvalidMethod.exit_code(), 1);
        assert_eq!(ProbeError::Bootstrap(TransportError::Timeout(20)).exit_code(), 1);

        let config = ConfigError::Validation(vec![]);
        assert_eq!(ProbeError::from(config).exit_code(), 2);
    }
}
