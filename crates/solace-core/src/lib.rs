// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Solace escalation service.
//!
//! This crate provides the error type, domain types, and the adapter traits
//! for the collaborators the escalation core depends on: the session/message/
//! ticket store, the severity classifier, and the auth provider.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SolaceError;
pub use types::{
    AdapterType, Capability, Classification, ClassifierRequest, EnsuredTicket, HealthStatus,
    HistoryEntry, Identity, Message, MessageRole, PlannedTask, Role, SendOutcome, Session, Severity,
    SeverityLevel, Ticket, TicketStatus,
};

pub use traits::{AuthAdapter, ClassifierAdapter, PluginAdapter, StorageAdapter};
