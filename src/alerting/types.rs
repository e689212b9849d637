//! Incident API types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to the incident API.
#[derive(Debug, Error)]
pub enum AlertingError {
    /// Request could not be sent or the connection failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("Incident API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// Client misconfiguration (bad header value, bad base URL).
    #[error("Alerting client misconfigured: {0}")]
    Config(String),
}

/// Result type for incident API operations.
pub type AlertingResult<T> = Result<T, AlertingError>;

/// Everything needed to open one incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentRequest {
    pub title: String,
    pub details: String,
    pub service_reference: String,
    /// Client-generated deduplication key.
    pub incident_key: String,
}

// ── Wire format ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct CreateIncidentEnvelope<'a> {
    pub incident: NewIncident<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewIncident<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub incident_key: &'a str,
    pub title: &'a str,
    pub body: IncidentBody<'a>,
    pub service: Reference<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct IncidentBody<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub details: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct Reference<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: &'a str,
}

impl<'a> From<&'a IncidentRequest> for CreateIncidentEnvelope<'a> {
    fn from(request: &'a IncidentRequest) -> Self {
        Self {
            incident: NewIncident {
                kind: "incident",
                incident_key: &request.incident_key,
                title: &request.title,
                body: IncidentBody {
                    kind: "incident_body",
                    details: &request.details,
                },
                service: Reference {
                    kind: "service_reference",
                    id: &request.service_reference,
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ResolveEnvelope<'a> {
    pub incidents: [IncidentUpdate<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct IncidentUpdate<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: &'a str,
    pub status: &'static str,
}

impl<'a> ResolveEnvelope<'a> {
    pub fn resolved(id: &'a str) -> Self {
        Self {
            incidents: [IncidentUpdate {
                kind: "incident_reference",
                id,
                status: "resolved",
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedIncident {
    pub incident: CreatedIncidentBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedIncidentBody {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ApiErrorEnvelope {
    /// Whether the API refused a resolve because the incident is already closed.
    pub fn is_already_resolved(&self) -> bool {
        std::iter::once(&self.error.message)
            .chain(self.error.errors.iter())
            .any(|msg| msg.to_ascii_lowercase().contains("already resolved"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_payload_shape() {
        let request = IncidentRequest {
            title: "web is not available".into(),
            details: "Server web is not available. Check it & fix it.".into(),
            service_reference: "PZW4R7U".into(),
            incident_key: "abc".into(),
        };

        let value = serde_json::to_value(CreateIncidentEnvelope::from(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "incident": {
                    "type": "incident",
                    "incident_key": "abc",
                    "title": "web is not available",
                    "body": {
                        "type": "incident_body",
                        "details": "Server web is not available. Check it & fix it."
                    },
                    "service": { "type": "service_reference", "id": "PZW4R7U" }
                }
            })
        );
    }

    #[test]
    fn test_resolve_payload_shape() {
        let value = serde_json::to_value(ResolveEnvelope::resolved("INC1")).unwrap();
        assert_eq!(
            value,
            json!({
                "incidents": [
                    { "type": "incident_reference", "id": "INC1", "status": "resolved" }
                ]
            })
        );
    }

    #[test]
    fn test_already_resolved_detection() {
        let body: ApiErrorEnvelope = serde_json::from_value(json!({
            "error": {
                "message": "Invalid Input Provided",
                "errors": ["Incident Already Resolved"]
            }
        }))
        .unwrap();
        assert!(body.is_already_resolved());

        let body: ApiErrorEnvelope =
            serde_json::from_value(json!({ "error": { "message": "Not Found" } })).unwrap();
        assert!(!body.is_already_resolved());
    }

    #[test]
    fn test_error_display() {
        let err = AlertingError::Status {
            status: 400,
            body: "bad".into(),
        };
        assert_eq!(err.to_string(), "Incident API returned 400: bad");
    }
}
