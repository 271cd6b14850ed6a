// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the session, message, and ticket store.

use async_trait::async_trait;

use crate::error::SolaceError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Availability, Message, NewMessage, NewTicket, Session, Ticket, TicketFilter, TicketStatus,
};

/// Adapter for the durable store behind sessions, the message log, and tickets.
///
/// Timestamps are assigned by the store. Conditional updates report whether a
/// row matched so callers can tell a lost race from success.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), SolaceError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), SolaceError>;

    // --- Sessions ---

    /// Idempotent upsert. An unowned session is claimed by `user_id`; an owned
    /// session keeps its owner. Returns the row as stored.
    async fn ensure_session(
        &self,
        session_id: &str,
        user_id: Option<&str>,
    ) -> Result<Session, SolaceError>;

    async fn get_session(&self, id: &str) -> Result<Option<Session>, SolaceError>;

    // --- Messages ---

    /// Append to the log, returning the stored row with its id and timestamp.
    async fn insert_message(&self, message: &NewMessage) -> Result<Message, SolaceError>;

    /// The `limit` most recent messages of a session, oldest first.
    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, SolaceError>;

    /// Messages ordered after the message with id `after`, oldest first.
    /// An absent or unknown cursor yields the whole session.
    async fn messages_after(
        &self,
        session_id: &str,
        after: Option<&str>,
    ) -> Result<Vec<Message>, SolaceError>;

    // --- Tickets ---

    /// Atomically return the active ticket for the pair or insert a new open one.
    /// The boolean is `true` when a row was inserted.
    async fn ensure_ticket(&self, ticket: &NewTicket) -> Result<(Ticket, bool), SolaceError>;

    async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, SolaceError>;

    /// `open -> assigned` guarded on the current status. `false` when no open row matched.
    async fn assign_ticket(&self, id: &str, psychologist_id: &str) -> Result<bool, SolaceError>;

    /// Append a psychologist reply to the ticket's session, only while the
    /// ticket is held by `psychologist_id` and assigned or in progress. An
    /// assigned ticket moves to in_progress in the same write.
    ///
    /// Returns the message and the status before the write, or `None` when
    /// nothing was written.
    async fn insert_ticket_reply(
        &self,
        ticket_id: &str,
        psychologist_id: &str,
        content: &str,
    ) -> Result<Option<(Message, TicketStatus)>, SolaceError>;

    /// Move a ticket to `to` only if its current status is in `from`.
    async fn transition_ticket(
        &self,
        id: &str,
        from: &[TicketStatus],
        to: TicketStatus,
    ) -> Result<bool, SolaceError>;

    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, SolaceError>;

    // --- Availability ---

    async fn set_availability(
        &self,
        user_id: &str,
        is_available: bool,
    ) -> Result<(), SolaceError>;

    async fn get_availability(&self, user_id: &str) -> Result<Option<Availability>, SolaceError>;
}
