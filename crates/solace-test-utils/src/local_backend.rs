// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process [`ChatBackend`] that drives a [`SupportService`] directly.

use std::sync::Arc;

use async_trait::async_trait;
use solace_client::ChatBackend;
use solace_core::{
    AuthAdapter, EnsuredTicket, Identity, Message, SendOutcome, Severity, SolaceError,
    TicketStatus,
};
use solace_escalation::SupportService;

/// Resolves tokens through the real auth adapter, then calls the service.
pub struct LocalBackend {
    support: SupportService,
    auth: Arc<dyn AuthAdapter + Send + Sync>,
}

impl LocalBackend {
    pub fn new(support: SupportService, auth: Arc<dyn AuthAdapter + Send + Sync>) -> Self {
        Self { support, auth }
    }

    async fn identify(&self, token: &str) -> Result<Identity, SolaceError> {
        self.auth.authenticate(token).await
    }
}

#[async_trait]
impl ChatBackend for LocalBackend {
    async fn send_message(
        &self,
        token: Option<&str>,
        session_id: Option<&str>,
        message: &str,
    ) -> Result<SendOutcome, SolaceError> {
        let caller = match token {
            Some(token) => Some(self.identify(token).await?),
            None => None,
        };
        self.support
            .send_message(caller.as_ref(), session_id, message)
            .await
    }

    async fn append_direct(
        &self,
        token: &str,
        session_id: &str,
        message: &str,
    ) -> Result<Message, SolaceError> {
        let caller = self.identify(token).await?;
        self.support.append_direct(&caller, session_id, message).await
    }

    async fn request_human(
        &self,
        token: &str,
        session_id: &str,
        severity: Option<Severity>,
    ) -> Result<EnsuredTicket, SolaceError> {
        let caller = self.identify(token).await?;
        self.support.request_human(&caller, session_id, severity).await
    }

    async fn ticket_status(&self, token: &str, ticket_id: &str) -> Result<TicketStatus, SolaceError> {
        let caller = self.identify(token).await?;
        Ok(self.support.ticket_status(&caller, ticket_id).await?.status)
    }
}
