// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lock / mode controller.
//!
//! The controller owns the client's view of one support conversation and
//! decides where a user message goes. Transitions:
//!
//! - `AiMode` -> `EscalatedWithTicket` when a reply escalates and carries a ticket id.
//! - `AiMode` -> `EscalatedNoTicket` when it escalates without one (signed out).
//! - `EscalatedNoTicket` -> `EscalatedWithTicket` via [`LockController::connect_to_psychologist`].
//! - `EscalatedWithTicket` -> `ResolvedReturnToAi` when a poll sees resolved or closed.
//! - `ResolvedReturnToAi` -> `AiMode` on the next successful send.
//!
//! Locked states never unlock on their own. Only the reconciliation poll
//! observing a terminal ticket status returns the conversation to AI mode.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use solace_core::{Message, SendOutcome, Severity, SolaceError};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{ChatBackend, TokenSource};

/// Default interval between ticket status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2500);

pub const LOCKED_NOTICE: &str =
    "We think it would help to talk to a person. Your chat is now with our support team.";
pub const SIGN_IN_NOTICE: &str =
    "Please sign in and choose \"Connect to a psychologist\" so we can bring in a person.";
pub const CONNECTING_NOTICE: &str = "Connecting you to a psychologist. Someone will join shortly.";
pub const SESSION_ENDED_NOTICE: &str =
    "Your session with the psychologist has ended. AI assistance has resumed.";

/// Client-visible conversation mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LockState {
    AiMode,
    /// Escalated, but no ticket could be created yet (e.g. signed out).
    EscalatedNoTicket,
    /// Waiting for, or talking to, a psychologist.
    EscalatedWithTicket { ticket_id: String },
    /// The ticket ended. Behaves like `AiMode` until the next send.
    ResolvedReturnToAi,
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        matches!(
            self,
            LockState::EscalatedNoTicket | LockState::EscalatedWithTicket { .. }
        )
    }

    pub fn ticket_id(&self) -> Option<&str> {
        match self {
            LockState::EscalatedWithTicket { ticket_id } => Some(ticket_id),
            _ => None,
        }
    }

    /// Locked without a ticket.
    pub fn pending_escalation(&self) -> bool {
        matches!(self, LockState::EscalatedNoTicket)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    User,
    Assistant,
    /// Local notices about mode changes.
    System,
    /// A failed operation, shown instead of a fabricated reply.
    Error,
}

/// One line of the conversation as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub content: String,
}

/// What happened to a sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendReport {
    /// AI mode: the classifier replied.
    Replied(SendOutcome),
    /// Locked: logged for the psychologist without classification.
    Delivered(Message),
}

/// Why [`LockController::run_reconciliation`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileExit {
    Cancelled,
    /// The ticket reached a terminal status and the controller returned to AI mode.
    Resolved { ticket_id: String },
}

#[derive(Debug)]
struct Inner {
    state: LockState,
    session_id: Option<String>,
    last_severity: Option<Severity>,
    transcript: Vec<TranscriptEntry>,
}

impl Inner {
    fn push(&mut self, kind: EntryKind, content: impl Into<String>) {
        self.transcript.push(TranscriptEntry {
            kind,
            content: content.into(),
        });
    }
}

/// Explicit state machine for one conversation, with injected backend and token source.
pub struct LockController {
    backend: Arc<dyn ChatBackend>,
    tokens: Arc<dyn TokenSource>,
    poll_interval: Duration,
    inner: Mutex<Inner>,
}

impl LockController {
    pub fn new(backend: Arc<dyn ChatBackend>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            backend,
            tokens,
            poll_interval: DEFAULT_POLL_INTERVAL,
            inner: Mutex::new(Inner {
                state: LockState::AiMode,
                session_id: None,
                last_severity: None,
                transcript: Vec::new(),
            }),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Continue an existing conversation instead of letting the server pick an id.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.inner.get_mut().session_id = Some(session_id.into());
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub async fn state(&self) -> LockState {
        self.inner.lock().await.state.clone()
    }

    pub async fn is_locked(&self) -> bool {
        self.inner.lock().await.state.is_locked()
    }

    pub async fn session_id(&self) -> Option<String> {
        self.inner.lock().await.session_id.clone()
    }

    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.inner.lock().await.transcript.clone()
    }

    /// Send a user message. AI mode goes through the classifier; locked
    /// modes append straight to the log.
    ///
    /// Failures are appended to the transcript as error entries and returned.
    /// A failure never changes the lock state.
    pub async fn send(&self, text: &str) -> Result<SendReport, SolaceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SolaceError::InvalidInput("message must not be empty".into()));
        }

        let (locked, session_id) = {
            let mut inner = self.inner.lock().await;
            inner.push(EntryKind::User, text);
            (inner.state.is_locked(), inner.session_id.clone())
        };

        if locked {
            self.send_direct(session_id, text).await
        } else {
            self.send_to_ai(session_id, text).await
        }
    }

    async fn send_to_ai(
        &self,
        session_id: Option<String>,
        text: &str,
    ) -> Result<SendReport, SolaceError> {
        let token = self.tokens.token();
        let result = self
            .backend
            .send_message(token.as_deref(), session_id.as_deref(), text)
            .await;

        let mut inner = self.inner.lock().await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "send failed");
                inner.push(EntryKind::Error, error_notice(&e));
                return Err(e);
            }
        };

        inner.session_id = Some(outcome.session_id.clone());
        inner.push(EntryKind::Assistant, outcome.reply.clone());

        if outcome.escalated {
            inner.last_severity = outcome.severity;
            inner.state = match &outcome.ticket_id {
                Some(ticket_id) => LockState::EscalatedWithTicket {
                    ticket_id: ticket_id.clone(),
                },
                None => LockState::EscalatedNoTicket,
            };
            inner.push(EntryKind::System, LOCKED_NOTICE);
            if outcome.ticket_id.is_none() {
                inner.push(EntryKind::System, SIGN_IN_NOTICE);
            }
            info!(session_id = %outcome.session_id, state = ?inner.state, "conversation locked");
        } else if inner.state == LockState::ResolvedReturnToAi {
            inner.state = LockState::AiMode;
        }

        Ok(SendReport::Replied(outcome))
    }

    async fn send_direct(
        &self,
        session_id: Option<String>,
        text: &str,
    ) -> Result<SendReport, SolaceError> {
        let result = match (self.tokens.token(), session_id) {
            (Some(token), Some(session_id)) => {
                self.backend.append_direct(&token, &session_id, text).await
            }
            (None, _) => Err(SolaceError::Unauthorized(
                "sign in to message the support team".into(),
            )),
            (Some(_), None) => Err(SolaceError::InvalidInput(
                "locked conversation has no session".into(),
            )),
        };

        match result {
            Ok(message) => {
                debug!(message_id = %message.id, "delivered directly to the log");
                Ok(SendReport::Delivered(message))
            }
            Err(e) => {
                self.inner
                    .lock()
                    .await
                    .push(EntryKind::Error, error_notice(&e));
                Err(e)
            }
        }
    }

    /// Create the ticket for a pending escalation. Requires a signed-in caller.
    ///
    /// Idempotent: with a ticket already present its id is returned.
    pub async fn connect_to_psychologist(&self) -> Result<String, SolaceError> {
        let (session_id, severity) = {
            let inner = self.inner.lock().await;
            match &inner.state {
                LockState::EscalatedWithTicket { ticket_id } => return Ok(ticket_id.clone()),
                LockState::EscalatedNoTicket => {}
                _ => {
                    return Err(SolaceError::InvalidInput(
                        "conversation has not been escalated".into(),
                    ));
                }
            }
            (inner.session_id.clone(), inner.last_severity)
        };

        let result = match (self.tokens.token(), session_id) {
            (Some(token), Some(session_id)) => {
                self.backend
                    .request_human(&token, &session_id, severity)
                    .await
            }
            (None, _) => Err(SolaceError::Unauthorized(
                "sign in to connect with a psychologist".into(),
            )),
            (Some(_), None) => Err(SolaceError::InvalidInput(
                "escalated conversation has no session".into(),
            )),
        };

        let mut inner = self.inner.lock().await;
        match result {
            Ok(ensured) => {
                inner.state = LockState::EscalatedWithTicket {
                    ticket_id: ensured.ticket_id.clone(),
                };
                inner.push(EntryKind::System, CONNECTING_NOTICE);
                info!(ticket_id = %ensured.ticket_id, created = ensured.created, "connected to support queue");
                Ok(ensured.ticket_id)
            }
            Err(e) => {
                // Show the raw reason; the user must not be left guessing.
                inner.push(EntryKind::Error, e.to_string());
                Err(e)
            }
        }
    }

    /// Poll the ticket until it ends or `cancel` fires.
    ///
    /// Ticks without a ticket or without a token are skipped, and failed polls
    /// are retried on the next tick. On a resolved or closed ticket the
    /// controller returns to AI mode and the loop ends.
    pub async fn run_reconciliation(&self, cancel: CancellationToken) -> ReconcileExit {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("reconciliation cancelled");
                    return ReconcileExit::Cancelled;
                }
                _ = interval.tick() => {}
            }

            let Some(ticket_id) = self
                .inner
                .lock()
                .await
                .state
                .ticket_id()
                .map(str::to_string)
            else {
                continue;
            };
            let Some(token) = self.tokens.token() else {
                debug!(ticket_id = %ticket_id, "no token, retrying next tick");
                continue;
            };

            match self.backend.ticket_status(&token, &ticket_id).await {
                Ok(status) if status.is_terminal() => {
                    if self.return_to_ai(&ticket_id).await {
                        info!(ticket_id = %ticket_id, %status, "ticket ended, back to AI mode");
                        return ReconcileExit::Resolved { ticket_id };
                    }
                }
                Ok(status) => debug!(ticket_id = %ticket_id, %status, "ticket still active"),
                Err(e) => warn!(ticket_id = %ticket_id, error = %e, "ticket poll failed"),
            }
        }
    }

    async fn return_to_ai(&self, ticket_id: &str) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.state.ticket_id() != Some(ticket_id) {
            return false;
        }
        inner.state = LockState::ResolvedReturnToAi;
        inner.last_severity = None;
        inner.push(EntryKind::System, SESSION_ENDED_NOTICE);
        true
    }
}

fn error_notice(e: &SolaceError) -> String {
    match e {
        SolaceError::Classifier { .. } => {
            "We couldn't check in on that message right now. If you are in danger, please contact local emergency services. Please try again.".to_string()
        }
        other => other.to_string(),
    }
}
