// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`ChatBackend`] over the gateway's HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use solace_core::{EnsuredTicket, Message, SendOutcome, Severity, SolaceError, TicketStatus};
use tracing::debug;

use crate::backend::ChatBackend;

/// Default request timeout. Kept above the classifier's own timeout so the
/// server reports classifier outages instead of the client giving up first.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct SendBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    message: &'a str,
}

#[derive(Serialize)]
struct DirectBody<'a> {
    message: &'a str,
}

#[derive(Serialize)]
struct TicketBody<'a> {
    session_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<Severity>,
}

#[derive(Deserialize)]
struct StatusBody {
    status: TicketStatus,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(default)]
    ticket_id: Option<String>,
    #[serde(default)]
    status: Option<TicketStatus>,
    #[serde(default)]
    action: Option<String>,
}

/// Talks to a running Solace gateway.
pub struct HttpChatBackend {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpChatBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SolaceError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SolaceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SolaceError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, SolaceError> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, "gateway returned an error");
        Err(error_from_response(status, &body, self.timeout))
    }
}

fn with_bearer(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> SolaceError {
    if e.is_timeout() {
        SolaceError::Timeout { duration: timeout }
    } else {
        SolaceError::Internal(format!("gateway request failed: {e}"))
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, SolaceError> {
    response
        .json()
        .await
        .map_err(|e| SolaceError::Internal(format!("unexpected gateway response: {e}")))
}

/// Rebuild a typed error from the gateway's `{error, message}` body.
///
/// Ticket conflicts without their `ticket_id` and `status` details fall back
/// to `Internal`. A gateway-reported timeout carries this client's timeout.
pub(crate) fn error_from_response(status: StatusCode, body: &str, timeout: Duration) -> SolaceError {
    let Ok(ErrorBody {
        error,
        message,
        ticket_id,
        status: ticket_status,
        action,
    }) = serde_json::from_str::<ErrorBody>(body)
    else {
        return match status {
            StatusCode::UNAUTHORIZED => SolaceError::Unauthorized(format!("gateway returned {status}")),
            _ => SolaceError::Internal(format!("gateway returned {status}")),
        };
    };
    match error.as_str() {
        "unauthorized" => SolaceError::Unauthorized(message),
        "forbidden" => SolaceError::Forbidden(message),
        "invalid_input" => SolaceError::InvalidInput(message),
        "not_found" => SolaceError::NotFound {
            entity: "resource",
            id: message,
        },
        "classifier_unavailable" => SolaceError::classifier(message),
        "session_not_ready" => SolaceError::SessionNotReady {
            session_id: String::new(),
            source: message.into(),
        },
        "already_taken" => match (ticket_id, ticket_status) {
            (Some(ticket_id), Some(status)) => SolaceError::TicketTaken { ticket_id, status },
            _ => SolaceError::Internal(format!("{error}: {message}")),
        },
        "invalid_transition" => match (ticket_id, ticket_status) {
            (Some(ticket_id), Some(from)) => SolaceError::InvalidTransition {
                ticket_id,
                from,
                action: transition_action(action.as_deref()),
            },
            _ => SolaceError::Internal(format!("{error}: {message}")),
        },
        "timeout" => SolaceError::Timeout { duration: timeout },
        _ => SolaceError::Internal(format!("{error}: {message}")),
    }
}

fn transition_action(action: Option<&str>) -> &'static str {
    match action {
        Some("resolve") => "resolve",
        Some("close") => "close",
        Some("reply") => "reply",
        _ => "update",
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send_message(
        &self,
        token: Option<&str>,
        session_id: Option<&str>,
        message: &str,
    ) -> Result<SendOutcome, SolaceError> {
        let request = self
            .client
            .post(self.url("/v1/messages"))
            .json(&SendBody {
                session_id,
                message,
            });
        decode(self.execute(with_bearer(request, token)).await?).await
    }

    async fn append_direct(
        &self,
        token: &str,
        session_id: &str,
        message: &str,
    ) -> Result<Message, SolaceError> {
        let request = self
            .client
            .post(self.url(&format!("/v1/sessions/{session_id}/messages")))
            .json(&DirectBody { message });
        decode(self.execute(with_bearer(request, Some(token))).await?).await
    }

    async fn request_human(
        &self,
        token: &str,
        session_id: &str,
        severity: Option<Severity>,
    ) -> Result<EnsuredTicket, SolaceError> {
        let request = self
            .client
            .post(self.url("/v1/tickets"))
            .json(&TicketBody {
                session_id,
                severity,
            });
        decode(self.execute(with_bearer(request, Some(token))).await?).await
    }

    async fn ticket_status(&self, token: &str, ticket_id: &str) -> Result<TicketStatus, SolaceError> {
        let request = self.client.get(self.url(&format!("/v1/tickets/{ticket_id}")));
        let body: StatusBody = decode(self.execute(with_bearer(request, Some(token))).await?).await?;
        Ok(body.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn typed_errors_survive_the_wire() {
        let err = error_from_response(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error":"classifier_unavailable","message":"no response within 9000ms"}"#,
            DEFAULT_TIMEOUT,
        );
        assert_eq!(err.kind(), "classifier_unavailable");
        assert!(err.to_string().contains("9000ms"));

        let err = error_from_response(
            StatusCode::FORBIDDEN,
            r#"{"error":"forbidden","message":"nope"}"#,
            DEFAULT_TIMEOUT,
        );
        assert_eq!(err.kind(), "forbidden");
    }

    #[test]
    fn ticket_conflicts_come_back_typed() {
        let err = error_from_response(
            StatusCode::CONFLICT,
            r#"{"error":"already_taken","message":"taken","ticket_id":"t1","status":"assigned"}"#,
            DEFAULT_TIMEOUT,
        );
        assert!(matches!(
            err,
            SolaceError::TicketTaken { ref ticket_id, status: TicketStatus::Assigned } if ticket_id == "t1"
        ));

        let err = error_from_response(
            StatusCode::CONFLICT,
            r#"{"error":"invalid_transition","message":"no","ticket_id":"t2","status":"resolved","action":"reply"}"#,
            DEFAULT_TIMEOUT,
        );
        assert!(matches!(
            err,
            SolaceError::InvalidTransition {
                ref ticket_id,
                from: TicketStatus::Resolved,
                action: "reply",
            } if ticket_id == "t2"
        ));

        // Without the details there is nothing to rebuild.
        let err = error_from_response(
            StatusCode::CONFLICT,
            r#"{"error":"already_taken","message":"taken"}"#,
            DEFAULT_TIMEOUT,
        );
        assert_eq!(err.kind(), "internal");

        let err = error_from_response(
            StatusCode::GATEWAY_TIMEOUT,
            r#"{"error":"timeout","message":"slow"}"#,
            Duration::from_secs(3),
        );
        assert!(matches!(err, SolaceError::Timeout { duration } if duration == Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn slow_gateway_is_a_typed_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/tickets/t1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "open"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let backend =
            HttpChatBackend::with_timeout(server.uri(), Duration::from_millis(50)).unwrap();
        let err = backend.ticket_status("tok", "t1").await.unwrap_err();
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn unparseable_error_bodies_fall_back_on_status() {
        assert_eq!(
            error_from_response(StatusCode::UNAUTHORIZED, "", DEFAULT_TIMEOUT).kind(),
            "unauthorized"
        );
        assert_eq!(
            error_from_response(StatusCode::BAD_GATEWAY, "<html>", DEFAULT_TIMEOUT).kind(),
            "internal"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = HttpChatBackend::new("http://localhost:3000/").unwrap();
        assert_eq!(backend.url("/v1/messages"), "http://localhost:3000/v1/messages");
    }

    #[tokio::test]
    async fn send_message_posts_body_and_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({"session_id": "s1", "message": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "session_id": "s1",
                "reply": "hello",
                "severity": 5,
                "severity_level": "High",
                "escalated": true,
                "plan": [],
                "tasks": [],
                "ticket_id": "t1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpChatBackend::new(server.uri()).unwrap();
        let outcome = backend.send_message(Some("tok"), Some("s1"), "hi").await.unwrap();
        assert!(outcome.escalated);
        assert_eq!(outcome.ticket_id.as_deref(), Some("t1"));
        assert_eq!(outcome.severity, Some(Severity::MAX));
    }

    #[tokio::test]
    async fn anonymous_send_omits_authorization_and_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_json(json!({"message": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "session_id": "generated",
                "reply": "hello",
                "severity": null,
                "severity_level": null,
                "escalated": false
            })))
            .mount(&server)
            .await;

        let backend = HttpChatBackend::new(server.uri()).unwrap();
        let outcome = backend.send_message(None, None, "hi").await.unwrap();
        assert_eq!(outcome.session_id, "generated");
        assert!(outcome.plan.is_empty());

        let received = server.received_requests().await.unwrap();
        assert!(received[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn classifier_outage_comes_back_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": "classifier_unavailable",
                "message": "classifier returned 500 Internal Server Error"
            })))
            .mount(&server)
            .await;

        let backend = HttpChatBackend::new(server.uri()).unwrap();
        let err = backend.send_message(None, None, "hi").await.unwrap_err();
        assert_eq!(err.kind(), "classifier_unavailable");
    }

    #[tokio::test]
    async fn ticket_status_reads_status_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/tickets/t1"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "t1",
                "status": "in_progress",
                "severity": 5
            })))
            .mount(&server)
            .await;

        let backend = HttpChatBackend::new(server.uri()).unwrap();
        let status = backend.ticket_status("tok", "t1").await.unwrap();
        assert_eq!(status, TicketStatus::InProgress);
    }

    #[tokio::test]
    async fn request_human_and_direct_append_hit_their_routes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/tickets"))
            .and(body_json(json!({"session_id": "s1"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ticket_id": "t9", "created": false})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/sessions/s1/messages"))
            .and(body_json(json!({"message": "still here"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "m1",
                "session_id": "s1",
                "role": "user",
                "content": "still here",
                "severity": null,
                "created_at": "2026-01-01T00:00:00.000Z"
            })))
            .mount(&server)
            .await;

        let backend = HttpChatBackend::new(server.uri()).unwrap();
        let ensured = backend.request_human("tok", "s1", None).await.unwrap();
        assert_eq!(ensured.ticket_id, "t9");
        assert!(!ensured.created);

        let message = backend.append_direct("tok", "s1", "still here").await.unwrap();
        assert_eq!(message.id, "m1");
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "unauthorized",
                "message": "token expired"
            })))
            .mount(&server)
            .await;

        let backend = HttpChatBackend::new(server.uri()).unwrap();
        let err = backend.ticket_status("old", "t1").await.unwrap_err();
        assert_eq!(err.kind(), "unauthorized");
    }
}
