//! PagerDuty REST client.
//!
//! # Responsibilities
//! - Open incidents against a service reference
//! - Resolve incidents by id
//! - Turn every non-success response into an error carrying the body

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, FROM};
use reqwest::StatusCode;

use crate::alerting::types::{
    AlertingError, AlertingResult, ApiErrorEnvelope, CreateIncidentEnvelope, CreatedIncident,
    IncidentRequest, ResolveEnvelope,
};
use crate::alerting::IncidentClient;
use crate::config::AlertingConfig;

const PAGERDUTY_ACCEPT: &str = "application/vnd.pagerduty+json;version=2";

/// Incident client for the PagerDuty v2 REST API.
#[derive(Clone)]
pub struct PagerDutyClient {
    http: reqwest::Client,
    incidents_url: String,
}

impl PagerDutyClient {
    /// Create a new client.
    ///
    /// Fails only on values that cannot be sent as headers or an API URL
    /// that cannot be joined; no request is made.
    pub fn new(config: &AlertingConfig) -> AlertingResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Token token={}", config.token))?,
        );
        headers.insert(FROM, header_value(&config.from_header)?);
        headers.insert(ACCEPT, HeaderValue::from_static(PAGERDUTY_ACCEPT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AlertingError::Config(e.to_string()))?;

        let base = url::Url::parse(&config.api_url)
            .map_err(|e| AlertingError::Config(format!("Invalid API URL '{}': {}", config.api_url, e)))?;
        let incidents_url = format!("{}/incidents", base.as_str().trim_end_matches('/'));

        Ok(Self { http, incidents_url })
    }
}

fn header_value(value: &str) -> AlertingResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|e| AlertingError::Config(format!("Invalid header value: {}", e)))?;
    header.set_sensitive(true);
    Ok(header)
}

#[async_trait]
impl IncidentClient for PagerDutyClient {
    async fn open(&self, request: &IncidentRequest) -> AlertingResult<String> {
        let response = self
            .http
            .post(&self.incidents_url)
            .json(&CreateIncidentEnvelope::from(request))
            .send()
            .await
            .map_err(|e| AlertingError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AlertingError::Transport(e.to_string()))?;

        if status != StatusCode::CREATED {
            tracing::error!(status = %status, body = %body, "Could not create incident");
            return Err(AlertingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedIncident =
            serde_json::from_str(&body).map_err(|e| AlertingError::Decode(e.to_string()))?;

        tracing::info!(
            incident_id = %created.incident.id,
            incident_key = %request.incident_key,
            "Incident created"
        );
        Ok(created.incident.id)
    }

    async fn resolve(&self, incident_id: &str) -> AlertingResult<()> {
        let response = self
            .http
            .put(&self.incidents_url)
            .json(&ResolveEnvelope::resolved(incident_id))
            .send()
            .await
            .map_err(|e| AlertingError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::OK {
            tracing::info!(incident_id = %incident_id, "Incident resolved");
            return Ok(());
        }

        let body = response
            .text()
            .await
            .map_err(|e| AlertingError::Transport(e.to_string()))?;

        let already_resolved = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|envelope| envelope.is_already_resolved())
            .unwrap_or(false);
        if already_resolved {
            tracing::info!(incident_id = %incident_id, "Incident was already resolved");
            return Ok(());
        }

        tracing::error!(status = %status, body = %body, incident_id = %incident_id, "Could not resolve incident");
        Err(AlertingError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl std::fmt::Debug for PagerDutyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerDutyClient")
            .field("incidents_url", &self.incidents_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(api_url: String) -> AlertingConfig {
        AlertingConfig {
            api_url,
            token: "secret".into(),
            from_header: "ops@example.com".into(),
            request_timeout_secs: 5,
        }
    }

    fn request() -> IncidentRequest {
        IncidentRequest {
            title: "web is not available".into(),
            details: "Server web is not available. Check it & fix it.".into(),
            service_reference: "PSVC".into(),
            incident_key: "KEY".into(),
        }
    }

    #[tokio::test]
    async fn test_open_returns_assigned_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/incidents"))
            .and(header("authorization", "Token token=secret"))
            .and(header("from", "ops@example.com"))
            .and(body_partial_json(json!({
                "incident": { "incident_key": "KEY", "service": { "id": "PSVC" } }
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "incident": { "id": "Q1ABC" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = PagerDutyClient::new(&test_config(server.uri())).unwrap();
        let id = client.open(&request()).await.unwrap();
        assert_eq!(id, "Q1ABC");
    }

    #[tokio::test]
    async fn test_open_non_created_status_is_error_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = PagerDutyClient::new(&test_config(server.uri())).unwrap();
        match client.open(&request()).await {
            Err(AlertingError::Status { status, body }) => {
                assert_eq!(status, 200);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_open_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
            .mount(&server)
            .await;

        let client = PagerDutyClient::new(&test_config(server.uri())).unwrap();
        let err = client.open(&request()).await.unwrap_err();
        assert!(matches!(err, AlertingError::Decode(_)));
    }

    #[tokio::test]
    async fn test_resolve() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/incidents"))
            .and(body_partial_json(json!({
                "incidents": [{ "id": "INC1", "status": "resolved" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "incidents": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = PagerDutyClient::new(&test_config(server.uri())).unwrap();
        client.resolve("INC1").await.unwrap();
    }

    #[tokio::test]
    async fn test_resolve_already_resolved_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "Invalid Input Provided", "errors": ["Incident Already Resolved"] }
            })))
            .mount(&server)
            .await;

        let client = PagerDutyClient::new(&test_config(server.uri())).unwrap();
        assert!(client.resolve("INC1").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_failure_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = PagerDutyClient::new(&test_config(server.uri())).unwrap();
        let err = client.resolve("INC1").await.unwrap_err();
        assert_eq!(err.to_string(), "Incident API returned 500: boom");
    }

    #[tokio::test]
    async fn test_unreachable_api_is_transport_error() {
        let client = PagerDutyClient::new(&test_config("http://127.0.0.1:9".into())).unwrap();
        let err = client.resolve("INC1").await.unwrap_err();
        assert!(matches!(err, AlertingError::Transport(_)));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut config = test_config("http://localhost".into());
        config.from_header = "bad\nvalue".into();
        assert!(matches!(
            PagerDutyClient::new(&config),
            Err(AlertingError::Config(_))
        ));
    }
}
