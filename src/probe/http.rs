//! HTTP reachability probe.
//!
//! # Responsibilities
//! - GET the endpoint URL once
//! - Classify the response: 2xx and 3xx are reachable, anything else is not

use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;

use crate::probe::{ProbeResult, Prober};

/// Probe backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(user_agent: &str) -> reqwest::Result<Self> {
        // Redirects are not followed: a 3xx already proves the server answers.
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeResult {
        tracing::debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "Probing endpoint");

        match self.client.get(url).timeout(timeout).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() || status.is_redirection() {
                    ProbeResult::Reachable
                } else {
                    tracing::warn!(url = %url, status = %status, "Probe failed: unexpected status");
                    ProbeResult::Unreachable
                }
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(url = %url, "Probe failed: timeout");
                ProbeResult::Unreachable
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Probe failed: connection error");
                ProbeResult::Unreachable
            }
        }
    }
}
