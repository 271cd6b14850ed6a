// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff assignment and handoff: the psychologist and admin side of a ticket.

use std::sync::Arc;

use solace_core::types::Availability;
use solace_core::{
    Capability, Identity, Message, SolaceError, StorageAdapter, Ticket, TicketStatus,
};
use tracing::{debug, warn};

use crate::log::{MessageLog, validate_content};
use crate::tickets::{TicketManager, is_assignee};

pub const JOINED_NOTE: &str = "A psychologist has joined the conversation.";
pub const ENDED_NOTE: &str = "The psychologist has ended this session.";

/// Operations for psychologists and admins.
///
/// Psychologist replies go straight to the message log and are never
/// classified.
#[derive(Clone)]
pub struct StaffDesk {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    log: MessageLog,
    tickets: TicketManager,
}

impl StaffDesk {
    pub fn new(storage: Arc<dyn StorageAdapter + Send + Sync>) -> Self {
        Self {
            log: MessageLog::new(storage.clone()),
            tickets: TicketManager::new(storage.clone()),
            storage,
        }
    }

    pub async fn list_open(&self, staff: &Identity) -> Result<Vec<Ticket>, SolaceError> {
        staff.require(Capability::HandleTickets)?;
        self.tickets.list_open().await
    }

    pub async fn list_mine(&self, staff: &Identity) -> Result<Vec<Ticket>, SolaceError> {
        staff.require(Capability::HandleTickets)?;
        self.tickets.list_assigned(&staff.user_id).await
    }

    pub async fn pickup(&self, ticket_id: &str, staff: &Identity) -> Result<Ticket, SolaceError> {
        let ticket = self.tickets.pickup(ticket_id, staff).await?;
        self.note(&ticket, JOINED_NOTE).await;
        Ok(ticket)
    }

    /// End the session: the ticket becomes resolved and the user's client
    /// returns to AI mode on its next poll.
    pub async fn end(&self, ticket_id: &str, staff: &Identity) -> Result<Ticket, SolaceError> {
        let ticket = self.tickets.resolve(ticket_id, staff).await?;
        self.note(&ticket, ENDED_NOTE).await;
        Ok(ticket)
    }

    /// Admin cancellation of any active ticket.
    pub async fn close(&self, ticket_id: &str, admin: &Identity) -> Result<Ticket, SolaceError> {
        let ticket = self.tickets.close(ticket_id, admin).await?;
        self.note(&ticket, ENDED_NOTE).await;
        Ok(ticket)
    }

    /// Append a psychologist reply. The first reply moves the ticket to in_progress.
    pub async fn reply(
        &self,
        ticket_id: &str,
        staff: &Identity,
        content: &str,
    ) -> Result<Message, SolaceError> {
        staff.require(Capability::HandleTickets)?;
        let content = validate_content(content)?;
        let ticket = self.tickets.get(ticket_id).await?;
        if !is_assignee(&ticket, staff) {
            return Err(SolaceError::Forbidden(format!(
                "ticket {ticket_id} is not assigned to the caller"
            )));
        }
        if !matches!(
            ticket.status,
            TicketStatus::Assigned | TicketStatus::InProgress
        ) {
            return Err(SolaceError::InvalidTransition {
                ticket_id: ticket_id.to_string(),
                from: ticket.status,
                action: "reply",
            });
        }
        self.tickets.reply(&ticket, staff, content).await
    }

    /// Messages of the ticket's session, for the assignee, an admin, or any
    /// staff member while the ticket is still open for pickup.
    pub async fn session_transcript(
        &self,
        ticket_id: &str,
        staff: &Identity,
        after: Option<&str>,
    ) -> Result<Vec<Message>, SolaceError> {
        staff.require(Capability::HandleTickets)?;
        let ticket = self.tickets.get(ticket_id).await?;
        let allowed = is_assignee(&ticket, staff)
            || staff.can(Capability::ManageTickets)
            || ticket.status == TicketStatus::Open;
        if !allowed {
            return Err(SolaceError::Forbidden(format!(
                "ticket {ticket_id} is not assigned to the caller"
            )));
        }
        self.log.transcript(&ticket.session_id, after).await
    }

    pub async fn set_availability(
        &self,
        staff: &Identity,
        is_available: bool,
    ) -> Result<Availability, SolaceError> {
        staff.require(Capability::HandleTickets)?;
        self.storage
            .set_availability(&staff.user_id, is_available)
            .await?;
        debug!(user_id = %staff.user_id, is_available, "availability set");
        self.storage
            .get_availability(&staff.user_id)
            .await?
            .ok_or_else(|| SolaceError::Internal("availability row missing after update".into()))
    }

    pub async fn availability(&self, staff: &Identity) -> Result<Option<Availability>, SolaceError> {
        staff.require(Capability::HandleTickets)?;
        self.storage.get_availability(&staff.user_id).await
    }

    async fn note(&self, ticket: &Ticket, content: &str) {
        if let Err(e) = self.log.note(&ticket.session_id, content).await {
            warn!(ticket_id = %ticket.id, error = %e, "failed to write session note");
        }
    }
}
