// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Solace escalation service.

use thiserror::Error;

use crate::types::TicketStatus;

/// The primary error type used across all Solace adapter traits and core operations.
#[derive(Debug, Error)]
pub enum SolaceError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Missing or invalid caller credential. Never retried.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but lacks the role or ownership required.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Request payload failed validation (empty content, bad role, bad severity).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The session row could not be ensured; the turn must not continue.
    #[error("session {session_id} is not ready: {source}")]
    SessionNotReady {
        session_id: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The severity classifier timed out, returned non-2xx, or sent a malformed payload.
    #[error("classifier unavailable: {message}")]
    Classifier {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A pickup lost the race: the ticket is no longer open.
    #[error("ticket {ticket_id} already taken (status {status})")]
    TicketTaken {
        ticket_id: String,
        status: TicketStatus,
    },

    /// The requested transition is not allowed from the ticket's current status.
    #[error("ticket {ticket_id} cannot {action} from status {from}")]
    InvalidTransition {
        ticket_id: String,
        from: TicketStatus,
        action: &'static str,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SolaceError {
    /// Stable machine-readable identifier for this error, used in API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            SolaceError::Config(_) => "config",
            SolaceError::Storage { .. } => "storage",
            SolaceError::Unauthorized(_) => "unauthorized",
            SolaceError::Forbidden(_) => "forbidden",
            SolaceError::InvalidInput(_) => "invalid_input",
            SolaceError::NotFound { .. } => "not_found",
            SolaceError::SessionNotReady { .. } => "session_not_ready",
            SolaceError::Classifier { .. } => "classifier_unavailable",
            SolaceError::TicketTaken { .. } => "already_taken",
            SolaceError::InvalidTransition { .. } => "invalid_transition",
            SolaceError::Timeout { .. } => "timeout",
            SolaceError::Internal(_) => "internal",
        }
    }

    /// Shorthand for a storage error built from a message.
    pub fn storage(message: impl Into<String>) -> Self {
        let message: String = message.into();
        SolaceError::Storage {
            source: message.into(),
        }
    }

    /// Shorthand for a classifier error without an underlying source.
    pub fn classifier(message: impl Into<String>) -> Self {
        SolaceError::Classifier {
            message: message.into(),
            source: None,
        }
    }
}
