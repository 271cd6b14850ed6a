// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types live in `solace-core::types`; this module re-exports
//! them and holds the column conversions shared by the query modules.

use std::str::FromStr;

use rusqlite::types::Type;

pub use solace_core::types::{
    Availability, Message, MessageRole, NewMessage, NewTicket, Session, Severity, Ticket,
    TicketFilter, TicketStatus,
};

/// Storage timestamp format. Lexicographic order matches chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time in the storage timestamp format.
pub fn timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a TEXT column into a strum-backed enum.
pub(crate) fn parse_text<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Convert an INTEGER column into a bounded [`Severity`].
pub(crate) fn parse_severity(idx: usize, value: u8) -> rusqlite::Result<Severity> {
    Severity::try_from(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}
