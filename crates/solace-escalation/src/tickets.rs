// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation ticket manager.
//!
//! Every transition is a single conditional write in storage, so the
//! status the write was guarded on is the one the ticket actually had.
//! A guard that matches nothing is reported as `TicketTaken` or
//! `InvalidTransition` with the status observed afterwards.

use std::sync::Arc;

use solace_core::types::{NewTicket, TicketFilter};
use solace_core::{
    Capability, EnsuredTicket, Identity, Message, MessageRole, Severity, SolaceError,
    StorageAdapter, Ticket, TicketStatus,
};
use solace_prometheus::recording::{record_escalation, record_message, record_ticket_transition};
use tracing::{debug, info, warn};

/// Summary stored on every escalation ticket.
pub fn ticket_summary(severity: Severity) -> String {
    format!("AI support escalation: severity {severity}/5")
}

#[derive(Clone)]
pub struct TicketManager {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
}

impl TicketManager {
    pub fn new(storage: Arc<dyn StorageAdapter + Send + Sync>) -> Self {
        Self { storage }
    }

    /// Return the active ticket for (user, session), creating one if none is active.
    ///
    /// Concurrent callers for the same pair all observe the same ticket id.
    /// Once a ticket is terminal the next call opens a new one.
    pub async fn ensure(
        &self,
        user_id: &str,
        session_id: &str,
        severity: Severity,
    ) -> Result<EnsuredTicket, SolaceError> {
        let (ticket, created) = self
            .storage
            .ensure_ticket(&NewTicket {
                user_id: user_id.to_string(),
                session_id: session_id.to_string(),
                severity,
                summary: ticket_summary(severity),
            })
            .await?;
        record_escalation(created);
        if created {
            record_ticket_transition(&TicketStatus::Open.to_string());
            info!(ticket_id = %ticket.id, session_id, %severity, "escalation ticket opened");
        } else {
            debug!(ticket_id = %ticket.id, session_id, status = %ticket.status, "active ticket reused");
        }
        Ok(EnsuredTicket {
            ticket_id: ticket.id,
            created,
        })
    }

    pub async fn get(&self, ticket_id: &str) -> Result<Ticket, SolaceError> {
        self.storage
            .get_ticket(ticket_id)
            .await?
            .ok_or_else(|| SolaceError::NotFound {
                entity: "ticket",
                id: ticket_id.to_string(),
            })
    }

    /// Claim an open ticket. First writer wins; everyone else gets `TicketTaken`.
    pub async fn pickup(&self, ticket_id: &str, psychologist: &Identity) -> Result<Ticket, SolaceError> {
        psychologist.require(Capability::HandleTickets)?;
        if !self
            .storage
            .assign_ticket(ticket_id, &psychologist.user_id)
            .await?
        {
            let current = self.get(ticket_id).await?;
            debug!(ticket_id, status = %current.status, "pickup lost");
            return Err(SolaceError::TicketTaken {
                ticket_id: ticket_id.to_string(),
                status: current.status,
            });
        }
        record_ticket_transition(&TicketStatus::Assigned.to_string());
        info!(ticket_id, psychologist_id = %psychologist.user_id, "ticket picked up");
        self.mark_available(&psychologist.user_id, false).await;
        self.get(ticket_id).await
    }

    /// Store a reply from the assignee. The reply and the move from assigned
    /// to in_progress commit together, guarded on the ticket still being held,
    /// so a reply racing an end is either stored before it or rejected.
    pub async fn reply(
        &self,
        ticket: &Ticket,
        psychologist: &Identity,
        content: &str,
    ) -> Result<Message, SolaceError> {
        let Some((message, was)) = self
            .storage
            .insert_ticket_reply(&ticket.id, &psychologist.user_id, content)
            .await?
        else {
            let current = self.get(&ticket.id).await?;
            return Err(SolaceError::InvalidTransition {
                ticket_id: ticket.id.clone(),
                from: current.status,
                action: "reply",
            });
        };
        record_message(&MessageRole::Psychologist.to_string());
        if was == TicketStatus::Assigned {
            record_ticket_transition(&TicketStatus::InProgress.to_string());
            debug!(ticket_id = %ticket.id, "ticket in progress");
        }
        Ok(message)
    }

    /// End a session: assigned or in_progress to resolved.
    ///
    /// Only the assignee or an admin may resolve.
    pub async fn resolve(&self, ticket_id: &str, actor: &Identity) -> Result<Ticket, SolaceError> {
        actor.require(Capability::HandleTickets)?;
        let ticket = self.get(ticket_id).await?;
        if !is_assignee(&ticket, actor) && !actor.can(Capability::ManageTickets) {
            return Err(SolaceError::Forbidden(format!(
                "ticket {ticket_id} is not assigned to the caller"
            )));
        }
        self.transition(
            &ticket,
            &[TicketStatus::Assigned, TicketStatus::InProgress],
            TicketStatus::Resolved,
            "resolve",
        )
        .await
    }

    /// Cancel any active ticket. Admin only.
    pub async fn close(&self, ticket_id: &str, actor: &Identity) -> Result<Ticket, SolaceError> {
        actor.require(Capability::ManageTickets)?;
        let ticket = self.get(ticket_id).await?;
        self.transition(&ticket, &TicketStatus::ACTIVE, TicketStatus::Closed, "close")
            .await
    }

    /// Open tickets, most severe first, oldest first within a severity.
    pub async fn list_open(&self) -> Result<Vec<Ticket>, SolaceError> {
        self.storage
            .list_tickets(&TicketFilter {
                statuses: vec![TicketStatus::Open],
                assignee: None,
            })
            .await
    }

    /// Tickets a psychologist is currently holding.
    pub async fn list_assigned(&self, psychologist_id: &str) -> Result<Vec<Ticket>, SolaceError> {
        self.storage
            .list_tickets(&TicketFilter {
                statuses: vec![TicketStatus::Assigned, TicketStatus::InProgress],
                assignee: Some(psychologist_id.to_string()),
            })
            .await
    }

    async fn transition(
        &self,
        ticket: &Ticket,
        from: &[TicketStatus],
        to: TicketStatus,
        action: &'static str,
    ) -> Result<Ticket, SolaceError> {
        if !self.storage.transition_ticket(&ticket.id, from, to).await? {
            let current = self.get(&ticket.id).await?;
            return Err(SolaceError::InvalidTransition {
                ticket_id: ticket.id.clone(),
                from: current.status,
                action,
            });
        }
        record_ticket_transition(&to.to_string());
        info!(ticket_id = %ticket.id, from = %ticket.status, to = %to, action, "ticket transitioned");
        if let Some(assignee) = &ticket.assigned_psychologist_id {
            self.mark_available(assignee, true).await;
        }
        self.get(&ticket.id).await
    }

    /// Availability is advisory; a failed flip never fails the transition.
    async fn mark_available(&self, user_id: &str, available: bool) {
        if let Err(e) = self.storage.set_availability(user_id, available).await {
            warn!(user_id, available, error = %e, "availability update failed");
        }
    }
}

pub(crate) fn is_assignee(ticket: &Ticket, identity: &Identity) -> bool {
    ticket.assigned_psychologist_id.as_deref() == Some(identity.user_id.as_str())
}
