//! HTTP entry point.
//!
//! # Responsibilities
//! - Create the Axum router for pass and single-endpoint triggers
//! - Wire up middleware (tracing, timeout, request ID, bearer auth)
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - `Ok` outcomes map to 200, `Failed` to 500, the body is the tag
//! - `/healthz` stays outside the auth layer

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::auth::require_api_key;
use crate::http::handlers;
use crate::reconcile::BatchRunner;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<BatchRunner>,
    pub api_key: Option<String>,
}

/// HTTP server triggering reconciliation passes.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(runner: Arc<BatchRunner>, config: ServerConfig) -> Self {
        let state = AppState {
            runner,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let protected = Router::new()
            .route(
                "/reconcile",
                get(handlers::reconcile_all).post(handlers::reconcile_all),
            )
            .route(
                "/reconcile/{handle}",
                get(handlers::reconcile_one).post(handlers::reconcile_one),
            )
            .route("/endpoints", get(handlers::list_endpoints))
            .route("/endpoints/{handle}", get(handlers::get_endpoint))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_api_key,
            ));

        Router::new()
            .route("/healthz", get(handlers::healthz))
            .merge(protected)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.request_timeout_secs,
                    ))),
            )
    }

    /// The configured router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
