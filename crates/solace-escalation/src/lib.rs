// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation core for the Solace support service.
//!
//! Takes free-text user messages through the severity classifier, keeps the
//! conversation log, and moves users from AI support to a human
//! psychologist through escalation tickets:
//!
//! - [`SessionStore`] ensures session rows before anything references them.
//! - [`MessageLog`] is the append-only per-session log and history window.
//! - [`EscalationPolicy`] decides when a classification escalates.
//! - [`TicketManager`] owns the ticket state machine.
//! - [`SupportService`] runs user turns, direct appends, and human requests.
//! - [`StaffDesk`] covers pickup, replies, and ending sessions.

pub mod log;
pub mod pipeline;
pub mod policy;
pub mod sessions;
pub mod staff;
pub mod tickets;

pub use log::MessageLog;
pub use pipeline::SupportService;
pub use policy::{Decision, EscalationPolicy};
pub use sessions::SessionStore;
pub use staff::StaffDesk;
pub use tickets::TicketManager;
