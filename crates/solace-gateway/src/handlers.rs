// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the user and staff surfaces.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use solace_core::types::Availability;
use solace_core::{
    EnsuredTicket, HealthStatus, Message, SendOutcome, Severity, Ticket,
};

use crate::auth::{Caller, MaybeCaller};
use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body for POST /v1/messages.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    /// Continue an existing conversation. A new id is generated when absent.
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

/// Request body for direct appends and psychologist replies.
#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// Request body for POST /v1/tickets.
#[derive(Debug, Deserialize)]
pub struct TicketRequest {
    pub session_id: String,
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Request body for PUT /v1/staff/availability.
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

/// `?after=<message id>` cursor for transcript reads.
#[derive(Debug, Default, Deserialize)]
pub struct TranscriptQuery {
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageList {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct TicketList {
    pub tickets: Vec<Ticket>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn get_public_health(State(state): State<GatewayState>) -> Response {
    let (code, status) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {reason}"))
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {e}")),
    };
    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    };
    (code, Json(body)).into_response()
}

/// GET /metrics
pub async fn get_public_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// POST /v1/messages
///
/// One AI-mode turn. Anonymous callers are allowed.
pub async fn post_messages(
    State(state): State<GatewayState>,
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<SendRequest>,
) -> Result<Json<SendOutcome>, ApiError> {
    let outcome = state
        .support
        .send_message(caller.as_ref(), body.session_id.as_deref(), &body.message)
        .await?;
    Ok(Json(outcome))
}

/// POST /v1/sessions/{id}/messages
///
/// Locked-mode send, logged without classification.
pub async fn post_session_message(
    State(state): State<GatewayState>,
    Caller(caller): Caller,
    Path(session_id): Path<String>,
    Json(body): Json<MessageBody>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let message = state
        .support
        .append_direct(&caller, &session_id, &body.message)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /v1/sessions/{id}/messages
pub async fn get_session_messages(
    State(state): State<GatewayState>,
    Caller(caller): Caller,
    Path(session_id): Path<String>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Json<MessageList>, ApiError> {
    let messages = state
        .support
        .transcript(&caller, &session_id, query.after.as_deref())
        .await?;
    Ok(Json(MessageList { messages }))
}

/// POST /v1/tickets
///
/// 201 when a ticket was created, 200 when an active one was returned.
pub async fn post_tickets(
    State(state): State<GatewayState>,
    Caller(caller): Caller,
    Json(body): Json<TicketRequest>,
) -> Result<(StatusCode, Json<EnsuredTicket>), ApiError> {
    let ensured = state
        .support
        .request_human(&caller, &body.session_id, body.severity)
        .await?;
    let code = if ensured.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((code, Json(ensured)))
}

/// GET /v1/tickets/{id}
pub async fn get_ticket(
    State(state): State<GatewayState>,
    Caller(caller): Caller,
    Path(ticket_id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    Ok(Json(state.support.ticket_status(&caller, &ticket_id).await?))
}

// --- Staff ---

/// GET /v1/staff/tickets/open
pub async fn get_open_tickets(
    State(state): State<GatewayState>,
    Caller(caller): Caller,
) -> Result<Json<TicketList>, ApiError> {
    let tickets = state.staff.list_open(&caller).await?;
    Ok(Json(TicketList { tickets }))
}

/// GET /v1/staff/tickets/mine
pub async fn get_my_tickets(
    State(state): State<GatewayState>,
    Caller(caller): Caller,
) -> Result<Json<TicketList>, ApiError> {
    let tickets = state.staff.list_mine(&caller).await?;
    Ok(Json(TicketList { tickets }))
}

/// POST /v1/staff/tickets/{id}/pickup
pub async fn post_pickup(
    State(state): State<GatewayState>,
    Caller(caller): Caller,
    Path(ticket_id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    Ok(Json(state.staff.pickup(&ticket_id, &caller).await?))
}

/// POST /v1/staff/tickets/{id}/end
pub async fn post_end(
    State(state): State<GatewayState>,
    Caller(caller): Caller,
    Path(ticket_id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    Ok(Json(state.staff.end(&ticket_id, &caller).await?))
}

/// POST /v1/staff/tickets/{id}/close
pub async fn post_close(
    State(state): State<GatewayState>,
    Caller(caller): Caller,
    Path(ticket_id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    Ok(Json(state.staff.close(&ticket_id, &caller).await?))
}

/// POST /v1/staff/tickets/{id}/reply
pub async fn post_reply(
    State(state): State<GatewayState>,
    Caller(caller): Caller,
    Path(ticket_id): Path<String>,
    Json(body): Json<MessageBody>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let message = state
        .staff
        .reply(&ticket_id, &caller, &body.message)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /v1/staff/tickets/{id}/messages
pub async fn get_ticket_messages(
    State(state): State<GatewayState>,
    Caller(caller): Caller,
    Path(ticket_id): Path<String>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Json<MessageList>, ApiError> {
    let messages = state
        .staff
        .session_transcript(&ticket_id, &caller, query.after.as_deref())
        .await?;
    Ok(Json(MessageList { messages }))
}

/// PUT /v1/staff/availability
pub async fn put_availability(
    State(state): State<GatewayState>,
    Caller(caller): Caller,
    Json(body): Json<AvailabilityRequest>,
) -> Result<Json<Availability>, ApiError> {
    Ok(Json(
        state
            .staff
            .set_availability(&caller, body.is_available)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_session_is_optional() {
        let req: SendRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert!(req.session_id.is_none());
        assert_eq!(req.message, "hi");
    }

    #[test]
    fn ticket_request_rejects_out_of_range_severity() {
        assert!(serde_json::from_str::<TicketRequest>(r#"{"session_id": "s", "severity": 9}"#).is_err());
        let req: TicketRequest = serde_json::from_str(r#"{"session_id": "s"}"#).unwrap();
        assert!(req.severity.is_none());
    }
}
