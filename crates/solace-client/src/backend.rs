// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the lock controller and the outside world.

use std::sync::Arc;

use async_trait::async_trait;
use solace_core::{EnsuredTicket, Message, SendOutcome, Severity, SolaceError, TicketStatus};
use tokio::sync::watch;

/// The user-facing request surface of the support service.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// AI-mode turn. `token` is optional: anonymous users may chat.
    async fn send_message(
        &self,
        token: Option<&str>,
        session_id: Option<&str>,
        message: &str,
    ) -> Result<SendOutcome, SolaceError>;

    /// Locked-mode send: append to the log without classification.
    async fn append_direct(
        &self,
        token: &str,
        session_id: &str,
        message: &str,
    ) -> Result<Message, SolaceError>;

    /// Ask for a human. Idempotent while a ticket is active.
    async fn request_human(
        &self,
        token: &str,
        session_id: &str,
        severity: Option<Severity>,
    ) -> Result<EnsuredTicket, SolaceError>;

    async fn ticket_status(&self, token: &str, ticket_id: &str) -> Result<TicketStatus, SolaceError>;
}

/// Supplies the caller's current bearer token, if signed in.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// A token that can be swapped or cleared while the controller runs.
#[derive(Clone)]
pub struct SharedToken {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl SharedToken {
    pub fn new(token: Option<String>) -> Self {
        let (tx, _rx) = watch::channel(token);
        Self { tx: Arc::new(tx) }
    }

    pub fn signed_out() -> Self {
        Self::new(None)
    }

    pub fn set(&self, token: impl Into<String>) {
        self.tx.send_replace(Some(token.into()));
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }
}

impl TokenSource for SharedToken {
    fn token(&self) -> Option<String> {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_token_updates_are_visible_to_clones() {
        let token = SharedToken::signed_out();
        let view = token.clone();
        assert_eq!(view.token(), None);

        token.set("abc");
        assert_eq!(view.token().as_deref(), Some("abc"));

        view.clear();
        assert_eq!(token.token(), None);
    }
}
