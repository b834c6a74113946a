//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid, non-empty ladder)
//! - Collect every problem instead of stopping at the first one

use std::net::SocketAddr;

use reqwest::Method;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProbeConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target url is required")]
    MissingUrl,

    #[error("invalid target url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("threads must be at least 1")]
    ZeroThreads,

    #[error("timeout must be at least 1 second")]
    ZeroTimeout,

    #[error("cooldown must be at least 2, got {0}")]
    CooldownTooSmall(u32),

    #[error("goal must be at least 1")]
    ZeroGoal,

    #[error("proxy host must not be empty")]
    EmptyProxyHost,

    #[error("proxy port must not be 0")]
    ZeroProxyPort,

    #[error("--proxy-port requires --proxy-host")]
    ProxyPortWithoutHost,

    #[error("{field} must be a finite, non-negative number of seconds")]
    InvalidDelay { field: &'static str },

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &ProbeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.target.url.is_empty() {
        errors.push(ValidationError::MissingUrl);
    } else {
        match Url::parse(&config.target.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::InvalidUrl {
                url: config.target.url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidUrl {
                url: config.target.url.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let method = &config.target.method;
    if method.is_empty() || Method::from_bytes(method.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidMethod(config.target.method.clone()));
    }

    if config.transport.threads == 0 {
        errors.push(ValidationError::ZeroThreads);
    }
    if config.transport.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if let Some(proxy) = &config.transport.proxy {
        if proxy.host.trim().is_empty() {
            errors.push(ValidationError::EmptyProxyHost);
        }
        if proxy.port == 0 {
            errors.push(ValidationError::ZeroProxyPort);
        }
    }

    if config.backoff.cooldown < 2 {
        errors.push(ValidationError::CooldownTooSmall(config.backoff.cooldown));
    }
    if config.backoff.goal == 0 {
        errors.push(ValidationError::ZeroGoal);
    }
    if !is_valid_delay(config.backoff.initial_delay_secs) {
        errors.push(ValidationError::InvalidDelay {
            field: "initial delay",
        });
    }
    let min_delay = config.backoff.initial_min_delay_secs;
    if !is_valid_delay(min_delay) || min_delay == 0.0 {
        errors.push(ValidationError::InvalidDelay {
            field: "initial minimum delay",
        });
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_delay(secs: f64) -> bool {
    secs.is_finite() && secs >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ProxyConfig;

    fn valid_config() -> ProbeConfig {
        let mut config = ProbeConfig::default();
        config.target.url = "http://127.0.0.1:3000/limited".to_string();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_url() {
        let errors = validate_config(&ProbeConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingUrl]);
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let mut config = valid_config();
        config.target.url = "ftp://example.com/file".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidUrl { .. }));
    }

    #[test]
    fn test_rejects_bad_method() {
        let mut config = valid_config();
        config.target.method = "GE T".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidMethod("GE T".to_string())]
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.transport.threads = 0;
        config.transport.timeout_secs = 0;
        config.backoff.cooldown = 1;
        config.backoff.goal = 0;
        config.transport.proxy = Some(ProxyConfig {
            host: " ".to_string(),
            port: 0,
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::CooldownTooSmall(1)));
        assert!(errors.contains(&ValidationError::EmptyProxyHost));
    }

    #[test]
    fn test_rejects_negative_initial_delay() {
        let mut config = valid_config();
        config.backoff.initial_delay_secs = -1.0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidDelay {
                field: "initial delay"
            }]
        );
    }

    #[test]
    fn test_rejects_bad_metrics_address() {
        let mut config = valid_config();
        config.observability.metrics_address = Some("not-an-addr".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidMetricsAddress("not-an-addr".to_string())]
        );
    }
}
