// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use solace_config::model::GatewayConfig;
use solace_core::{SolaceError, StorageAdapter};
use solace_escalation::{StaffDesk, SupportService};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{SharedAuth, auth_middleware, optional_auth_middleware};
use crate::handlers;

/// State for the unauthenticated health and metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

impl HealthState {
    pub fn new(prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>) -> Self {
        Self {
            start_time: std::time::Instant::now(),
            prometheus_render,
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub support: SupportService,
    pub staff: StaffDesk,
    /// Auth collaborator that bearer tokens are forwarded to.
    pub auth: SharedAuth,
    pub storage: Arc<dyn StorageAdapter + Send + Sync>,
    pub health: HealthState,
}

/// Gateway server bind address.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl From<&GatewayConfig> for ServerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Build the full route table.
///
/// - `GET /health`, `GET /metrics`: public
/// - `POST /v1/messages`: optional auth
/// - everything else under `/v1`: bearer auth, role checks in the core
pub fn build_router(state: GatewayState) -> Router {
    let auth = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .route("/metrics", get(handlers::get_public_metrics))
        .with_state(state.clone());

    let chat_routes = Router::new()
        .route("/v1/messages", post(handlers::post_messages))
        .route_layer(axum_middleware::from_fn_with_state(
            auth.clone(),
            optional_auth_middleware,
        ))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/v1/sessions/{id}/messages",
            post(handlers::post_session_message).get(handlers::get_session_messages),
        )
        .route("/v1/tickets", post(handlers::post_tickets))
        .route("/v1/tickets/{id}", get(handlers::get_ticket))
        .route("/v1/staff/tickets/open", get(handlers::get_open_tickets))
        .route("/v1/staff/tickets/mine", get(handlers::get_my_tickets))
        .route("/v1/staff/tickets/{id}/pickup", post(handlers::post_pickup))
        .route("/v1/staff/tickets/{id}/end", post(handlers::post_end))
        .route("/v1/staff/tickets/{id}/close", post(handlers::post_close))
        .route("/v1/staff/tickets/{id}/reply", post(handlers::post_reply))
        .route(
            "/v1/staff/tickets/{id}/messages",
            get(handlers::get_ticket_messages),
        )
        .route("/v1/staff/availability", put(handlers::put_availability))
        .route_layer(axum_middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(chat_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until `shutdown` is cancelled, then drain in-flight requests.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), SolaceError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SolaceError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| SolaceError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
