//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use endpoint_sentinel::config::SentinelConfig;

/// Mock monitored endpoint whose status code can be changed between passes.
pub struct Target {
    pub addr: SocketAddr,
    status: Arc<AtomicU16>,
}

impl Target {
    pub fn url(&self) -> String {
        format!("http://{}/health", self.addr)
    }

    pub fn set_status(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }
}

/// Start a programmable target answering every request with the current status.
pub async fn start_target(initial_status: u16) -> Target {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let status = Arc::new(AtomicU16::new(initial_status));

    let shared = status.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let code = shared.load(Ordering::SeqCst);
            tokio::spawn(respond(socket, code));
        }
    });

    Target { addr, status }
}

/// Start a target that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_stalled_target() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

async fn respond(mut socket: TcpStream, status: u16) {
    // Drain the request head before answering.
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 512];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let reason = match status {
        200 => "OK",
        204 => "No Content",
        301 => "Moved Permanently",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nLocation: /elsewhere\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status, reason
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Complete configuration pointing at a local store and alerting API.
pub fn sentinel_config(store: &Path, alerting_url: &str) -> SentinelConfig {
    let mut config = SentinelConfig::default();
    config.store.path = store.to_string_lossy().into_owned();
    config.alerting.api_url = alerting_url.to_string();
    config.alerting.token = "test-token".into();
    config.alerting.from_header = "oncall@example.com".into();
    config.metrics.statsd_host = "127.0.0.1:8125".into();
    config.metrics.prefix = "test.sentinel".into();
    config.probe.timeout_ms = 500;
    config
}

/// Write a raw endpoint record the way an operator would provision it.
pub fn provision(store: &Path, handle: &str, record: serde_json::Value) {
    std::fs::create_dir_all(store).unwrap();
    std::fs::write(
        store.join(format!("{handle}.json")),
        serde_json::to_vec_pretty(&record).unwrap(),
    )
    .unwrap();
}

/// Read an endpoint record back as JSON.
pub fn read_record(store: &Path, handle: &str) -> serde_json::Value {
    let bytes = std::fs::read(store.join(format!("{handle}.json"))).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
