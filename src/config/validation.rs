//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the settings a reconciliation pass cannot run without
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SentinelConfig → Result<(), Vec<ValidationError>>
//! - Structural checks run at load time; required credentials are checked
//!   at the start of every pass so a half-configured process can still serve
//!   `/healthz` and `show`

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::SentinelConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} is not a valid address: '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} is not a valid URL: '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} is required (env {env})")]
    Missing { field: &'static str, env: &'static str },
}

/// Structural validation run when the config is loaded.
pub fn validate_config(config: &SentinelConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.probe.timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "probe.timeout_ms" });
    }
    if config.alerting.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "alerting.request_timeout_secs" });
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "server.request_timeout_secs" });
    }
    if config.schedule.enabled && config.schedule.interval_secs == 0 {
        errors.push(ValidationError::Zero { field: "schedule.interval_secs" });
    }
    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "server.bind_address",
            value: config.server.bind_address.clone(),
        });
    }
    if config.metrics.prometheus_enabled
        && config.metrics.prometheus_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "metrics.prometheus_address",
            value: config.metrics.prometheus_address.clone(),
        });
    }
    if url::Url::parse(&config.alerting.api_url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: "alerting.api_url",
            value: config.alerting.api_url.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Settings without which a reconciliation pass must not start.
pub fn validate_required(config: &SentinelConfig) -> Result<(), Vec<ValidationError>> {
    let required = [
        ("alerting.token", "PAGERDUTY_TOKEN", &config.alerting.token),
        ("alerting.from_header", "PAGERDUTY_FROM_HEADER", &config.alerting.from_header),
        ("metrics.statsd_host", "STATSD_HOST", &config.metrics.statsd_host),
        ("metrics.prefix", "STATSD_PREFIX", &config.metrics.prefix),
    ];

    let errors: Vec<_> = required
        .into_iter()
        .filter(|(_, _, value)| value.trim().is_empty())
        .map(|(field, env, _)| ValidationError::Missing { field, env })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
