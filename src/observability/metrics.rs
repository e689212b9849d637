//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Emit reconciliation counters and timers to a StatsD collector
//! - Mirror the same events into the `metrics` facade
//! - Optionally expose a Prometheus scrape endpoint
//!
//! # Metrics
//! - `<prefix>.probe.ok`, `<prefix>.probe.failed` (counter)
//! - `<prefix>.incident.created`, `<prefix>.incident.resolved` (counter)
//! - `<prefix>.outcome.failed` (counter)
//! - `<prefix>.probe`, `<prefix>.reconcile`, `<prefix>.pass` (timer, ms)
//! - `sentinel_events_total{event}` / `sentinel_duration_seconds{op}` (facade)
//!
//! # Design Decisions
//! - Fire-and-forget: send errors are logged at debug and dropped
//! - Non-blocking UDP socket, so a dead collector never stalls a pass
//! - Host names resolve off the request path and are retried with backoff

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::MetricsConfig;

const DEFAULT_STATSD_PORT: u16 = 8125;
const RESOLVE_RETRY_MIN: Duration = Duration::from_secs(1);
const RESOLVE_RETRY_MAX: Duration = Duration::from_secs(60);

/// Best-effort counters and timers.
pub trait MetricsEmitter: Send + Sync {
    fn increment(&self, name: &str);
    fn timing(&self, name: &str, start: Instant);
}

type Sink = (UdpSocket, SocketAddr);

/// StatsD emitter that also records into the `metrics` facade.
#[derive(Debug)]
pub struct Metrics {
    sink: Arc<OnceLock<Sink>>,
    prefix: String,
}

impl Metrics {
    /// Build an emitter from config. Never fails and never blocks inside a
    /// runtime: IP literals connect immediately, host names are resolved in
    /// the background and retried until they resolve. Lines emitted before
    /// that are dropped.
    pub fn new(config: &MetricsConfig) -> Self {
        let sink = Arc::new(OnceLock::new());
        let host = config.statsd_host.trim();

        if host.is_empty() {
            tracing::warn!("StatsD disabled: no collector configured");
        } else if let Some(target) = literal_target(host) {
            install(&sink, host, target);
        } else {
            let endpoint = with_default_port(host);
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(resolve_in_background(endpoint, sink.clone()));
                }
                Err(_) => match endpoint.to_socket_addrs().map(|mut a| a.next()) {
                    Ok(Some(target)) => {
                        install(&sink, host, target);
                    }
                    Ok(None) => tracing::warn!(statsd_host = %host, "StatsD disabled: collector did not resolve"),
                    Err(e) => tracing::warn!(statsd_host = %host, error = %e, "StatsD disabled"),
                },
            }
        }

        Self {
            sink,
            prefix: config.prefix.trim_end_matches('.').to_string(),
        }
    }

    /// Emitter that only records into the facade.
    pub fn facade_only() -> Self {
        Self {
            sink: Arc::new(OnceLock::new()),
            prefix: String::new(),
        }
    }

    /// Whether the StatsD collector address is known.
    pub fn collector_ready(&self) -> bool {
        self.sink.get().is_some()
    }

    fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix, name)
        }
    }

    fn send(&self, line: String) {
        match self.sink.get() {
            Some((socket, target)) => {
                if let Err(e) = socket.send_to(line.as_bytes(), target) {
                    tracing::debug!(error = %e, "Dropped StatsD packet");
                }
            }
            None => tracing::trace!(line = %line, "StatsD collector not ready"),
        }
    }
}

impl MetricsEmitter for Metrics {
    fn increment(&self, name: &str) {
        metrics::counter!("sentinel_events_total", "event" => name.to_string()).increment(1);
        self.send(format!("{}:1|c", self.key(name)));
    }

    fn timing(&self, name: &str, start: Instant) {
        let elapsed = start.elapsed();
        metrics::histogram!("sentinel_duration_seconds", "op" => name.to_string())
            .record(elapsed.as_secs_f64());
        self.send(format!("{}:{}|ms", self.key(name), elapsed.as_millis()));
    }
}

/// `host:port` or a bare IP, without touching DNS.
fn literal_target(host: &str) -> Option<SocketAddr> {
    host.parse::<SocketAddr>()
        .ok()
        .or_else(|| host.parse::<IpAddr>().ok().map(|ip| SocketAddr::new(ip, DEFAULT_STATSD_PORT)))
}

fn with_default_port(host: &str) -> String {
    if host.contains(':') {
        host.to_string()
    } else {
        format!("{host}:{DEFAULT_STATSD_PORT}")
    }
}

fn bind_for(target: SocketAddr) -> std::io::Result<Sink> {
    let bind: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(bind)?;
    socket.set_nonblocking(true)?;
    Ok((socket, target))
}

fn install(sink: &OnceLock<Sink>, host: &str, target: SocketAddr) -> bool {
    match bind_for(target) {
        Ok(bound) => {
            let _ = sink.set(bound);
            tracing::debug!(statsd_host = %host, target = %target, "StatsD collector connected");
            true
        }
        Err(e) => {
            tracing::warn!(statsd_host = %host, error = %e, "StatsD socket unavailable");
            false
        }
    }
}

async fn resolve_in_background(endpoint: String, sink: Arc<OnceLock<Sink>>) {
    let mut delay = RESOLVE_RETRY_MIN;
    loop {
        match tokio::net::lookup_host(endpoint.as_str()).await {
            Ok(mut addrs) => match addrs.next() {
                Some(target) => {
                    if install(&sink, &endpoint, target) {
                        return;
                    }
                }
                None => tracing::warn!(statsd_host = %endpoint, "StatsD collector did not resolve, retrying"),
            },
            Err(e) => {
                tracing::warn!(statsd_host = %endpoint, error = %e, "StatsD lookup failed, retrying")
            }
        }
        tokio::time::sleep(delay).await;
        delay = (delay * 2).min(RESOLVE_RETRY_MAX);
    }
}

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a tokio runtime.
pub fn init_prometheus(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus recorder"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn collector() -> (UdpSocket, MetricsConfig) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let config = MetricsConfig {
            statsd_host: socket.local_addr().unwrap().to_string(),
            prefix: "prod.sentinel.".into(),
            ..MetricsConfig::default()
        };
        (socket, config)
    }

    fn recv(socket: &UdpSocket) -> String {
        let mut buf = [0u8; 512];
        let n = socket.recv(&mut buf).unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    }

    #[test]
    fn test_counter_line() {
        let (socket, config) = collector();
        let metrics = Metrics::new(&config);

        metrics.increment("incident.created");
        assert_eq!(recv(&socket), "prod.sentinel.incident.created:1|c");
    }

    #[test]
    fn test_timer_line() {
        let (socket, config) = collector();
        let metrics = Metrics::new(&config);

        metrics.timing("probe", Instant::now());
        let line = recv(&socket);
        assert!(line.starts_with("prod.sentinel.probe:"), "{line}");
        assert!(line.ends_with("|ms"), "{line}");
    }

    #[test]
    fn test_missing_collector_is_silent() {
        let metrics = Metrics::new(&MetricsConfig::default());
        assert!(!metrics.collector_ready());
        metrics.increment("probe.ok");
        metrics.timing("probe", Instant::now());
    }

    #[tokio::test]
    async fn test_host_name_resolves_in_background() {
        let config = MetricsConfig {
            statsd_host: "localhost:8125".into(),
            ..MetricsConfig::default()
        };
        let metrics = Metrics::new(&config);

        for _ in 0..50 {
            if metrics.collector_ready() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(metrics.collector_ready());
        metrics.increment("probe.ok");
    }

    #[tokio::test]
    async fn test_unresolvable_host_does_not_block() {
        let config = MetricsConfig {
            statsd_host: "collector.invalid".into(),
            ..MetricsConfig::default()
        };
        let start = Instant::now();
        let metrics = Metrics::new(&config);

        assert!(start.elapsed() < Duration::from_millis(100));
        assert!(!metrics.collector_ready());
        metrics.increment("probe.ok");
    }

    #[test]
    fn test_literal_targets() {
        assert_eq!(
            literal_target("10.0.0.5"),
            Some("10.0.0.5:8125".parse().unwrap())
        );
        assert_eq!(
            literal_target("127.0.0.1:9125"),
            Some("127.0.0.1:9125".parse().unwrap())
        );
        assert_eq!(literal_target("statsd.internal"), None);
        assert_eq!(with_default_port("statsd.internal"), "statsd.internal:8125");
    }

    #[test]
    fn test_unprefixed_key() {
        assert_eq!(Metrics::facade_only().key("probe.ok"), "probe.ok");
    }
}
