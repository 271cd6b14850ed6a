// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the escalation core.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::SolaceError;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Classifier,
    Auth,
    Observability,
}

// --- Sessions and messages ---

/// A conversation session. Rows are upserted before any message or ticket references them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// Owning user. `None` while the session was only used anonymously.
    pub user_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Author of a message log entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    Psychologist,
    /// Server-authored notes. Never accepted from callers.
    System,
}

impl MessageRole {
    /// Whether callers of the message log may append entries with this role.
    pub fn is_caller_writable(self) -> bool {
        !matches!(self, MessageRole::System)
    }
}

/// A persisted message log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub role: MessageRole,
    pub content: String,
    /// Severity attached to assistant replies produced by the classifier.
    pub severity: Option<Severity>,
    /// Server-assigned, monotonically non-decreasing within a session.
    pub created_at: String,
}

/// Input for appending to the message log. Id and timestamp are assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub session_id: String,
    pub role: MessageRole,
    pub content: String,
    pub severity: Option<Severity>,
}

/// A `{role, content}` pair fed back to the classifier as conversational memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: MessageRole,
    pub content: String,
}

impl From<Message> for HistoryEntry {
    fn from(message: Message) -> Self {
        Self {
            role: message.role,
            content: message.content,
        }
    }
}

// --- Severity ---

/// Coarse ordinal severity score, 0 through 5. Not a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    /// Highest severity; the default escalation threshold.
    pub const MAX: Severity = Severity(5);

    /// Create a severity, rejecting values above 5.
    pub fn new(value: u8) -> Result<Self, SolaceError> {
        if value > Self::MAX.0 {
            return Err(SolaceError::InvalidInput(format!(
                "severity must be between 0 and 5, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// 0-2 low, 3-4 medium, 5 high.
    pub fn level(self) -> SeverityLevel {
        match self.0 {
            0..=2 => SeverityLevel::Low,
            3..=4 => SeverityLevel::Medium,
            _ => SeverityLevel::High,
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = SolaceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Severity::new(value)
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.0
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User-facing concern label derived from a severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
}

// --- Classifier contract ---

/// Input to the severity classifier: the new message plus the recent history window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRequest {
    pub message: String,
    pub history: Vec<HistoryEntry>,
}

/// A suggested self-care task returned alongside a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u32>,
}

/// Validated classifier output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub reply: String,
    /// `None` when the classifier could not score the message.
    pub severity: Option<Severity>,
    /// The classifier's own recommendation; the escalation policy makes the final call.
    pub escalated: bool,
    #[serde(default)]
    pub plan: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<PlannedTask>,
}

/// Result of one AI-mode turn, as returned to the user surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub session_id: String,
    pub reply: String,
    pub severity: Option<Severity>,
    pub severity_level: Option<SeverityLevel>,
    /// The escalation policy's decision, not the classifier's raw flag.
    pub escalated: bool,
    #[serde(default)]
    pub plan: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<PlannedTask>,
    /// Present once a ticket exists for this session. Absent for anonymous escalations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
}

// --- Escalation tickets ---

/// Escalation ticket lifecycle: open -> assigned -> in_progress -> resolved | closed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Assigned,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Statuses that count against the one-active-ticket-per-session invariant.
    pub const ACTIVE: [TicketStatus; 3] = [
        TicketStatus::Open,
        TicketStatus::Assigned,
        TicketStatus::InProgress,
    ];

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TicketStatus::Resolved | TicketStatus::Closed)
    }
}

/// A human-escalation case bound to a (user, session) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    pub status: TicketStatus,
    pub severity: Severity,
    pub summary: String,
    /// Retained after resolution for audit.
    pub assigned_psychologist_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub user_id: String,
    pub session_id: String,
    pub severity: Severity,
    pub summary: String,
}

/// Result of an idempotent ticket creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsuredTicket {
    pub ticket_id: String,
    /// `false` when an already-active ticket was returned.
    pub created: bool,
}

/// Filter for ticket listings. Empty `statuses` matches every status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub statuses: Vec<TicketStatus>,
    pub assignee: Option<String>,
}

/// Advisory psychologist availability flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub user_id: String,
    pub is_available: bool,
    pub updated_at: String,
}

// --- Identity and roles ---

/// Role claim issued by the auth collaborator at authentication time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    User,
    Psychologist,
    Admin,
}

/// Operations gated on role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    /// Talk to the assistant and request a human.
    Chat,
    /// Pick up, reply to, and end escalation tickets.
    HandleTickets,
    /// Close any ticket regardless of assignee.
    ManageTickets,
}

impl Role {
    pub fn grants(self, capability: Capability) -> bool {
        match capability {
            Capability::Chat => true,
            Capability::HandleTickets => matches!(self, Role::Psychologist | Role::Admin),
            Capability::ManageTickets => matches!(self, Role::Admin),
        }
    }
}

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.grants(capability)
    }

    /// Returns `Forbidden` unless the role grants `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), SolaceError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(SolaceError::Forbidden(format!(
                "role {} lacks capability {capability}",
                self.role
            )))
        }
    }
}
