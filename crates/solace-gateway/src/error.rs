// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`SolaceError`] to HTTP responses.
//!
//! Bodies are `{"error": <kind>, "message": <text>}` where `kind` is the
//! stable [`SolaceError::kind`] string. Ticket conflicts also carry
//! `ticket_id`, the ticket's current `status` and, for refused transitions,
//! the `action`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use solace_core::{SolaceError, TicketStatus};

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
}

impl ErrorResponse {
    fn new(err: &SolaceError, message: String) -> Self {
        let (ticket_id, status, action) = match err {
            SolaceError::TicketTaken { ticket_id, status } => {
                (Some(ticket_id.clone()), Some(*status), None)
            }
            SolaceError::InvalidTransition {
                ticket_id,
                from,
                action,
            } => (Some(ticket_id.clone()), Some(*from), Some(*action)),
            _ => (None, None, None),
        };
        Self {
            error: err.kind(),
            message,
            ticket_id,
            status,
            action,
        }
    }
}

/// Handler error wrapper.
#[derive(Debug)]
pub struct ApiError(pub SolaceError);

impl From<SolaceError> for ApiError {
    fn from(err: SolaceError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &SolaceError) -> StatusCode {
    match err {
        SolaceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        SolaceError::Forbidden(_) => StatusCode::FORBIDDEN,
        SolaceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SolaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        SolaceError::SessionNotReady { .. } | SolaceError::Classifier { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        SolaceError::TicketTaken { .. } | SolaceError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        SolaceError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        SolaceError::Config(_) | SolaceError::Storage { .. } | SolaceError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            "internal server error".to_string()
        } else {
            tracing::debug!(error = %self.0, status = %status, "request rejected");
            self.0.to_string()
        };
        let body = ErrorResponse::new(&self.0, message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solace_core::TicketStatus;
    use tracing_test::traced_test;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        let cases = [
            (SolaceError::Unauthorized("x".into()), 401),
            (SolaceError::Forbidden("x".into()), 403),
            (SolaceError::InvalidInput("x".into()), 400),
            (
                SolaceError::NotFound {
                    entity: "ticket",
                    id: "t".into(),
                },
                404,
            ),
            (
                SolaceError::SessionNotReady {
                    session_id: "s".into(),
                    source: "disk".into(),
                },
                503,
            ),
            (SolaceError::classifier("timeout"), 503),
            (
                SolaceError::TicketTaken {
                    ticket_id: "t".into(),
                    status: TicketStatus::Assigned,
                },
                409,
            ),
            (
                SolaceError::InvalidTransition {
                    ticket_id: "t".into(),
                    from: TicketStatus::Open,
                    action: "resolve",
                },
                409,
            ),
            (
                SolaceError::Timeout {
                    duration: std::time::Duration::from_secs(1),
                },
                504,
            ),
            (SolaceError::storage("locked"), 500),
        ];
        for (err, code) in cases {
            assert_eq!(status_for(&err).as_u16(), code, "{err}");
        }
    }

    #[test]
    fn conflicts_carry_ticket_details() {
        let body = ErrorResponse::new(
            &SolaceError::InvalidTransition {
                ticket_id: "t1".into(),
                from: TicketStatus::Resolved,
                action: "reply",
            },
            "ticket t1 cannot reply from status resolved".into(),
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "invalid_transition");
        assert_eq!(json["ticket_id"], "t1");
        assert_eq!(json["status"], "resolved");
        assert_eq!(json["action"], "reply");

        let body = ErrorResponse::new(&SolaceError::Forbidden("no".into()), "no".into());
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("ticket_id").is_none());
        assert!(json.get("status").is_none());
    }

    #[test]
    #[traced_test]
    fn internal_errors_do_not_leak_detail() {
        let response = ApiError(SolaceError::storage("table escalation_tickets is locked")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Detail goes to the log only.
        assert!(logs_contain("escalation_tickets is locked"));
    }
}
