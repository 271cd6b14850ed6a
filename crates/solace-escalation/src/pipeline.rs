// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The user-facing support pipeline.
//!
//! One AI-mode turn runs: validate -> ensure session -> read history ->
//! append the user message -> classify -> append the reply -> apply the
//! escalation policy -> ensure a ticket when the caller is known.
//! Classifier failures are returned to the caller as errors. They are never
//! turned into a quiet "no escalation" reply.

use std::sync::Arc;
use std::time::Instant;

use solace_config::model::EscalationConfig;
use solace_core::{
    Capability, ClassifierAdapter, ClassifierRequest, EnsuredTicket, Identity, Message,
    MessageRole, SendOutcome, Severity, SolaceError, StorageAdapter, Ticket,
};
use solace_prometheus::recording::{record_classification, record_classifier_latency};
use tracing::{info, warn};

use crate::log::{MessageLog, validate_content};
use crate::policy::EscalationPolicy;
use crate::sessions::{SessionStore, new_session_id};
use crate::tickets::TicketManager;

/// Entry point for end-user operations.
#[derive(Clone)]
pub struct SupportService {
    sessions: SessionStore,
    log: MessageLog,
    tickets: TicketManager,
    classifier: Arc<dyn ClassifierAdapter + Send + Sync>,
    policy: EscalationPolicy,
    history_window: usize,
}

impl SupportService {
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        classifier: Arc<dyn ClassifierAdapter + Send + Sync>,
        policy: EscalationPolicy,
        history_window: usize,
    ) -> Self {
        Self {
            sessions: SessionStore::new(storage.clone()),
            log: MessageLog::new(storage.clone()),
            tickets: TicketManager::new(storage),
            classifier,
            policy,
            history_window,
        }
    }

    pub fn from_config(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        classifier: Arc<dyn ClassifierAdapter + Send + Sync>,
        config: &EscalationConfig,
    ) -> Result<Self, SolaceError> {
        let policy = EscalationPolicy::from_config(config)?;
        Ok(Self::new(storage, classifier, policy, config.history_window))
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn tickets(&self) -> &TicketManager {
        &self.tickets
    }

    /// Run one AI-mode turn.
    ///
    /// A fresh session id is generated when `session_id` is `None`. Anonymous
    /// callers may chat, and when their turn escalates the outcome reports
    /// `escalated = true` without a ticket id.
    pub async fn send_message(
        &self,
        caller: Option<&Identity>,
        session_id: Option<&str>,
        message: &str,
    ) -> Result<SendOutcome, SolaceError> {
        let content = validate_content(message)?;
        if let Some(identity) = caller {
            identity.require(Capability::Chat)?;
        }
        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => new_session_id(),
        };

        self.sessions.ensure(&session_id, caller).await?;

        // Read before appending so the window holds prior turns only.
        let history = self.log.history(&session_id, self.history_window).await?;
        self.log
            .append(&session_id, MessageRole::User, content)
            .await?;

        let request = ClassifierRequest {
            message: content.to_string(),
            history,
        };
        let started = Instant::now();
        let classification = match self.classifier.classify(&request).await {
            Ok(classification) => {
                record_classification("ok");
                classification
            }
            Err(e) => {
                record_classification("failure");
                warn!(session_id = %session_id, error = %e, "classification failed");
                return Err(e);
            }
        };
        record_classifier_latency(started.elapsed().as_secs_f64());

        self.log
            .append_assistant(&session_id, &classification.reply, classification.severity)
            .await?;

        let decision = self.policy.decide(&classification);
        let ticket_id = match (decision.escalate, caller) {
            (true, Some(identity)) => {
                let severity = decision.severity.unwrap_or(self.policy.threshold());
                let ensured = self
                    .tickets
                    .ensure(&identity.user_id, &session_id, severity)
                    .await?;
                Some(ensured.ticket_id)
            }
            (true, None) => {
                info!(session_id = %session_id, "anonymous turn escalated; ticket deferred until sign-in");
                None
            }
            (false, _) => None,
        };

        Ok(SendOutcome {
            session_id,
            reply: classification.reply,
            severity: decision.severity,
            severity_level: decision.severity.map(Severity::level),
            escalated: decision.escalate,
            plan: classification.plan,
            tasks: classification.tasks,
            ticket_id,
        })
    }

    /// Locked-mode send: log the message for the psychologist without classifying it.
    ///
    /// A session escalated before sign-in is claimed here, so the user's
    /// first locked message after signing in is not lost.
    pub async fn append_direct(
        &self,
        caller: &Identity,
        session_id: &str,
        message: &str,
    ) -> Result<Message, SolaceError> {
        let content = validate_content(message)?;
        caller.require(Capability::Chat)?;
        self.sessions.ensure(session_id, Some(caller)).await?;
        self.log.append(session_id, MessageRole::User, content).await
    }

    /// "Connect to a psychologist": ensure a ticket for a session the caller owns.
    ///
    /// Without an explicit severity the ticket carries the escalation threshold.
    pub async fn request_human(
        &self,
        caller: &Identity,
        session_id: &str,
        severity: Option<Severity>,
    ) -> Result<EnsuredTicket, SolaceError> {
        caller.require(Capability::Chat)?;
        self.sessions.ensure(session_id, Some(caller)).await?;
        let severity = severity.unwrap_or(self.policy.threshold());
        self.tickets
            .ensure(&caller.user_id, session_id, severity)
            .await
    }

    /// Ticket as seen by its owner or by staff.
    pub async fn ticket_status(
        &self,
        caller: &Identity,
        ticket_id: &str,
    ) -> Result<Ticket, SolaceError> {
        let ticket = self.tickets.get(ticket_id).await?;
        if ticket.user_id != caller.user_id && !caller.can(Capability::HandleTickets) {
            return Err(SolaceError::Forbidden(format!(
                "ticket {ticket_id} belongs to another user"
            )));
        }
        Ok(ticket)
    }

    /// Session transcript for its owner or an admin.
    pub async fn transcript(
        &self,
        caller: &Identity,
        session_id: &str,
        after: Option<&str>,
    ) -> Result<Vec<Message>, SolaceError> {
        self.sessions.readable(session_id, caller).await?;
        self.log.transcript(session_id, after).await
    }
}
