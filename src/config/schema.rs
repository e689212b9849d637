//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the sentinel.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the sentinel.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SentinelConfig {
    /// HTTP trigger endpoint settings.
    pub server: ServerConfig,

    /// Interval scheduler settings.
    pub schedule: ScheduleConfig,

    /// Reachability probe settings.
    pub probe: ProbeConfig,

    /// Incident API settings.
    pub alerting: AlertingConfig,

    /// Endpoint state storage.
    pub store: StoreConfig,

    /// StatsD / Prometheus settings.
    pub metrics: MetricsConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Reconciliation pass policy.
    pub batch: BatchConfig,
}

/// HTTP trigger endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional bearer token required on trigger routes.
    pub api_key: Option<String>,

    /// Upper bound on a single HTTP request, in seconds.
    ///
    /// A full pass over many endpoints can take a while, so keep this generous.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            api_key: None,
            request_timeout_secs: 300,
        }
    }
}

/// Interval scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Run passes on a timer while serving.
    pub enabled: bool,

    /// Seconds between pass starts.
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 60,
        }
    }
}

/// Reachability probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Hard timeout for one probe in milliseconds.
    pub timeout_ms: u64,

    /// User-Agent header sent with probes.
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            user_agent: concat!("endpoint-sentinel/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Incident API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertingConfig {
    /// Base URL of the incident API.
    pub api_url: String,

    /// API token. Overridden by `PAGERDUTY_TOKEN`.
    pub token: String,

    /// Email of the acting user, sent as the `From` header.
    /// Overridden by `PAGERDUTY_FROM_HEADER`.
    pub from_header: String,

    /// Timeout for one incident API call in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.pagerduty.com".to_string(),
            token: String::new(),
            from_header: String::new(),
            request_timeout_secs: 10,
        }
    }
}

/// Endpoint state storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one JSON document per endpoint handle.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "./endpoints".to_string(),
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// StatsD collector, "host" or "host:port". Overridden by `STATSD_HOST`.
    pub statsd_host: String,

    /// Key prefix for every StatsD metric. Overridden by `STATSD_PREFIX`.
    pub prefix: String,

    /// Expose a Prometheus scrape endpoint in serve mode.
    pub prometheus_enabled: bool,

    /// Prometheus endpoint bind address.
    pub prometheus_address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            statsd_host: String::new(),
            prefix: String::new(),
            prometheus_enabled: false,
            prometheus_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// Reconciliation pass policy.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Report the whole pass as failed when any endpoint fails.
    pub fail_on_partial: bool,
}
