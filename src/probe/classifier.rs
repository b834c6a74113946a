//! Outcome classification.
//!
//! # Rules
//! - Transport failure → Blocked
//! - 429 Too Many Requests, 403 Forbidden → Blocked
//! - Anything else → Allowed
//!
//! The bootstrap probe is stricter: 429 and 405 end the session before the
//! adaptive loop starts.

use crate::error::ProbeError;
use crate::transport::{ProbeResponse, TransportError};

pub const TOO_MANY_REQUESTS: u16 = 429;
pub const FORBIDDEN: u16 = 403;
pub const METHOD_NOT_ALLOWED: u16 = 405;

/// Result of a single probe as seen by the backoff logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Allowed,
    Blocked,
}

impl Outcome {
    pub fn is_blocked(self) -> bool {
        self == Outcome::Blocked
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Allowed => "allowed",
            Outcome::Blocked => "blocked",
        }
    }
}

/// Classify a status code.
pub fn classify_status(status: u16) -> Outcome {
    match status {
        TOO_MANY_REQUESTS | FORBIDDEN => Outcome::Blocked,
        _ => Outcome::Allowed,
    }
}

/// Classify a transport result.
pub fn classify(result: &Result<ProbeResponse, TransportError>) -> Outcome {
    match result {
        Ok(response) => classify_status(response.status),
        Err(_) => Outcome::Blocked,
    }
}

/// Reject bootstrap responses that make probing impossible.
pub fn check_bootstrap(status: u16) -> Result<(), ProbeError> {
    match status {
        TOO_MANY_REQUESTS => Err(ProbeError::AlreadyRateLimited),
        METHOD_NOT_ALLOWED => Err(ProbeError::InvalidMethod),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_statuses() {
        assert_eq!(classify_status(429), Outcome::Blocked);
        assert_eq!(classify_status(403), Outcome::Blocked);
    }

    #[test]
    fn test_outcome_labels() {
        assert!(Outcome::Blocked.is_blocked());
        assert!(!Outcome::Allowed.is_blocked());
        assert_eq!(Outcome::Blocked.as_str(), "blocked");
        assert_eq!(Outcome::Allowed.as_str(), "allowed");
    }

    #[test]
    fn test_other_statuses_are_allowed() {
        for status in [200, 201, 204, 301, 400, 404, 405, 500, 502, 503] {
            assert_eq!(classify_status(status), Outcome::Allowed, "status {}", status);
        }
    }

    #[test]
    fn test_transport_error_is_blocked() {
        let result = Err(TransportError::Protocol("connection reset".into()));
        assert_eq!(classify(&result), Outcome::Blocked);

        let result = Err(TransportError::Timeout(20));
        assert_eq!(classify(&result), Outcome::Blocked);
    }

    #[test]
    fn test_classification_is_stable() {
        let result = Ok(ProbeResponse::new(429, "slow down"));
        assert_eq!(classify(&result), classify(&result));

        let result = Ok(ProbeResponse::new(200, "ok"));
        assert_eq!(classify(&result), Outcome::Allowed);
        assert_eq!(classify(&result), Outcome::Allowed);
    }

    #[test]
    fn test_bootstrap_check() {
        assert!(matches!(check_bootstrap(429), Err(ProbeError::AlreadyRateLimited)));
        assert!(matches!(check_bootstrap(405), Err(ProbeError::InvalidMethod)));
        assert!(check_bootstrap(200).is_ok());
        // 403 is a block in the loop but an acceptable baseline.
        assert!(check_bootstrap(403).is_ok());
    }
}
