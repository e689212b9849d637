use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::endpoint::{EndpointState, Phase};
use crate::http::server::AppState;
use crate::reconcile::Outcome;
use crate::store::StoreError;

#[derive(Debug, Default, Deserialize)]
pub struct PassQuery {
    /// Return the full pass report instead of the bare tag.
    #[serde(default)]
    pub report: bool,
}

#[derive(Serialize)]
pub struct EndpointView {
    pub handle: String,
    pub phase: Phase,
    pub state: EndpointState,
}

fn status_for(outcome: Outcome) -> StatusCode {
    if outcome.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn outcome_response(outcome: Outcome) -> Response {
    (status_for(outcome), outcome.tag().as_str()).into_response()
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn reconcile_all(
    State(state): State<AppState>,
    Query(query): Query<PassQuery>,
) -> Response {
    // Runs detached: a request timeout or disconnect must not cut a pass
    // short between an alerting call and the write that records it.
    let runner = state.runner.clone();
    let task = tokio::spawn(async move { runner.reconcile_all().await }.in_current_span());
    let report = match task.await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Reconciliation pass task failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if query.report {
        (status_for(report.outcome), Json(report)).into_response()
    } else {
        outcome_response(report.outcome)
    }
}

pub async fn reconcile_one(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Response {
    let runner = state.runner.clone();
    let task = tokio::spawn(async move { runner.reconcile_one(&handle).await }.in_current_span());
    match task.await {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => {
            tracing::error!(error = %e, "Endpoint reconciliation task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn list_endpoints(State(state): State<AppState>) -> Response {
    let store = state.runner.reconciler().store();
    let handles = match store.list_handles().await {
        Ok(handles) => handles,
        Err(e) => {
            tracing::error!(error = %e, "Could not list endpoint handles");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut views = Vec::with_capacity(handles.len());
    for handle in handles {
        match store.get(&handle).await {
            Ok(endpoint) => views.push(EndpointView {
                handle,
                phase: endpoint.phase(),
                state: endpoint,
            }),
            Err(e) => {
                tracing::warn!(handle = %handle, error = %e, "Skipping unreadable endpoint state");
            }
        }
    }
    Json(views).into_response()
}

pub async fn get_endpoint(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Response {
    match state.runner.reconciler().store().get(&handle).await {
        Ok(endpoint) => Json(EndpointView {
            handle,
            phase: endpoint.phase(),
            state: endpoint,
        })
        .into_response(),
        Err(StoreError::NotFound(_) | StoreError::InvalidHandle(_)) => {
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            tracing::error!(handle = %handle, error = %e, "Could not read endpoint state");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
