// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only message log and the classifier history window.

use std::sync::Arc;

use solace_core::types::NewMessage;
use solace_core::{HistoryEntry, Message, MessageRole, Severity, SolaceError, StorageAdapter};
use solace_prometheus::recording::record_message;
use tracing::debug;

/// Longest message body accepted from callers, in characters.
pub const MAX_MESSAGE_CHARS: usize = 8000;

/// Trim `content` and reject empty or oversized bodies.
pub fn validate_content(content: &str) -> Result<&str, SolaceError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(SolaceError::InvalidInput("message must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err(SolaceError::InvalidInput(format!(
            "message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

/// Ordered per-session message log.
///
/// Validates content and role only. Whether the caller may write to the
/// session is decided by the service that owns the log.
#[derive(Clone)]
pub struct MessageLog {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
}

impl MessageLog {
    pub fn new(storage: Arc<dyn StorageAdapter + Send + Sync>) -> Self {
        Self { storage }
    }

    /// Append a caller-authored entry. `system` is reserved.
    pub async fn append(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, SolaceError> {
        if !role.is_caller_writable() {
            return Err(SolaceError::InvalidInput(format!(
                "role {role} cannot be written by callers"
            )));
        }
        let content = validate_content(content)?;
        self.insert(session_id, role, content.to_string(), None).await
    }

    /// Store the classifier's reply verbatim along with its raw severity.
    pub(crate) async fn append_assistant(
        &self,
        session_id: &str,
        reply: &str,
        severity: Option<Severity>,
    ) -> Result<Message, SolaceError> {
        self.insert(session_id, MessageRole::Assistant, reply.to_string(), severity)
            .await
    }

    /// Server-authored note visible in the transcript.
    pub(crate) async fn note(&self, session_id: &str, content: &str) -> Result<Message, SolaceError> {
        self.insert(session_id, MessageRole::System, content.to_string(), None)
            .await
    }

    /// The `limit` most recent entries, oldest first.
    pub async fn history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, SolaceError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let messages = self.storage.recent_messages(session_id, limit).await?;
        Ok(messages.into_iter().map(HistoryEntry::from).collect())
    }

    /// Full entries after the message `after`, or the whole session.
    pub async fn transcript(
        &self,
        session_id: &str,
        after: Option<&str>,
    ) -> Result<Vec<Message>, SolaceError> {
        self.storage.messages_after(session_id, after).await
    }

    async fn insert(
        &self,
        session_id: &str,
        role: MessageRole,
        content: String,
        severity: Option<Severity>,
    ) -> Result<Message, SolaceError> {
        let message = self
            .storage
            .insert_message(&NewMessage {
                session_id: session_id.to_string(),
                role,
                content,
                severity,
            })
            .await?;
        record_message(&role.to_string());
        debug!(session_id, message_id = %message.id, role = %role, "message appended");
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_trimmed() {
        assert_eq!(validate_content("  hello \n").unwrap(), "hello");
    }

    #[test]
    fn blank_content_is_rejected() {
        for blank in ["", "   ", "\n\t"] {
            let err = validate_content(blank).unwrap_err();
            assert_eq!(err.kind(), "invalid_input");
        }
    }

    #[test]
    fn oversized_content_is_rejected() {
        let long = "é".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(validate_content(&long).is_err());
        let exact = "é".repeat(MAX_MESSAGE_CHARS);
        assert!(validate_content(&exact).is_ok());
    }
}
