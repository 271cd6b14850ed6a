// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation ticket operations.
//!
//! Every state change is a single conditional statement so that a lost race
//! shows up as zero affected rows rather than a silent overwrite.

use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior, params, params_from_iter};
use solace_core::SolaceError;

use crate::database::{Database, map_tr_err};
use crate::models::{
    Message, MessageRole, NewMessage, NewTicket, Ticket, TicketFilter, TicketStatus,
    parse_severity, parse_text, timestamp,
};
use crate::queries::messages::append_row;

const TICKET_COLUMNS: &str = "id, user_id, session_id, status, severity, summary, \
     assigned_psychologist_id, created_at, updated_at";

fn ticket_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        user_id: row.get(1)?,
        session_id: row.get(2)?,
        status: parse_text(3, row.get(3)?)?,
        severity: parse_severity(4, row.get(4)?)?,
        summary: row.get(5)?,
        assigned_psychologist_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn select_by_id(conn: &Connection, id: &str) -> rusqlite::Result<Option<Ticket>> {
    conn.query_row(
        &format!("SELECT {TICKET_COLUMNS} FROM escalation_tickets WHERE id = ?1"),
        params![id],
        ticket_from_row,
    )
    .optional()
}

fn select_active(
    conn: &Connection,
    user_id: &str,
    session_id: &str,
) -> rusqlite::Result<Option<Ticket>> {
    conn.query_row(
        &format!(
            "SELECT {TICKET_COLUMNS} FROM escalation_tickets
             WHERE user_id = ?1 AND session_id = ?2
               AND status IN ('open', 'assigned', 'in_progress')"
        ),
        params![user_id, session_id],
        ticket_from_row,
    )
    .optional()
}

/// Return the active ticket for the (user, session) pair, inserting an open
/// one if none exists. The boolean is `true` when a row was inserted.
///
/// Runs as one immediate transaction. The partial unique index backs this up
/// if another process inserted first.
pub async fn ensure_ticket(
    db: &Database,
    ticket: &NewTicket,
) -> Result<(Ticket, bool), SolaceError> {
    let ticket = ticket.clone();
    let id = uuid::Uuid::new_v4().to_string();
    let now = timestamp();
    db.connection()
        .call(move |conn| -> Result<(Ticket, bool), rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            if let Some(existing) = select_active(&tx, &ticket.user_id, &ticket.session_id)? {
                return Ok((existing, false));
            }

            let inserted = tx.execute(
                "INSERT INTO escalation_tickets
                     (id, user_id, session_id, status, severity, summary, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 'open', ?4, ?5, ?6, ?6)",
                params![
                    id,
                    ticket.user_id,
                    ticket.session_id,
                    ticket.severity.value(),
                    ticket.summary,
                    now,
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(err, msg))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    return match select_active(&tx, &ticket.user_id, &ticket.session_id)? {
                        Some(existing) => Ok((existing, false)),
                        None => Err(rusqlite::Error::SqliteFailure(err, msg)),
                    };
                }
                Err(e) => return Err(e),
            }

            let created = select_by_id(&tx, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok((created, true))
        })
        .await
        .map_err(map_tr_err)
}

/// Get a ticket by ID.
pub async fn get_ticket(db: &Database, id: &str) -> Result<Option<Ticket>, SolaceError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Ticket>, rusqlite::Error> { select_by_id(conn, &id) })
        .await
        .map_err(map_tr_err)
}

/// Claim an open ticket. Returns `false` if the ticket was not `open`.
pub async fn assign_ticket(
    db: &Database,
    id: &str,
    psychologist_id: &str,
) -> Result<bool, SolaceError> {
    let id = id.to_string();
    let psychologist_id = psychologist_id.to_string();
    let now = timestamp();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE escalation_tickets
                 SET status = 'assigned', assigned_psychologist_id = ?2, updated_at = ?3
                 WHERE id = ?1 AND status = 'open'",
                params![id, psychologist_id, now],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Move a ticket to `to` if its current status is one of `from`.
pub async fn transition_ticket(
    db: &Database,
    id: &str,
    from: &[TicketStatus],
    to: TicketStatus,
) -> Result<bool, SolaceError> {
    if from.is_empty() {
        return Ok(false);
    }
    let placeholders = (0..from.len())
        .map(|i| format!("?{}", i + 4))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE escalation_tickets SET status = ?1, updated_at = ?2
         WHERE id = ?3 AND status IN ({placeholders})"
    );
    let mut values = vec![to.to_string(), timestamp(), id.to_string()];
    values.extend(from.iter().map(ToString::to_string));

    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Append a reply from the ticket's assignee while the ticket is assigned or
/// in progress. An assigned ticket moves to in_progress in the same
/// transaction, so a reply can never land after the ticket has ended.
///
/// Returns the stored message and the status the ticket had before, or `None`
/// without writing when the guard does not match.
pub async fn insert_ticket_reply(
    db: &Database,
    ticket_id: &str,
    psychologist_id: &str,
    content: &str,
) -> Result<Option<(Message, TicketStatus)>, SolaceError> {
    let ticket_id = ticket_id.to_string();
    let psychologist_id = psychologist_id.to_string();
    let content = content.to_string();
    let id = uuid::Uuid::new_v4().to_string();
    let now = timestamp();
    db.connection()
        .call(move |conn| -> Result<Option<(Message, TicketStatus)>, rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let Some(ticket) = select_by_id(&tx, &ticket_id)? else {
                return Ok(None);
            };
            let held = ticket.assigned_psychologist_id.as_deref() == Some(psychologist_id.as_str());
            if !held || !matches!(ticket.status, TicketStatus::Assigned | TicketStatus::InProgress) {
                return Ok(None);
            }

            let message = append_row(
                &tx,
                id,
                NewMessage {
                    session_id: ticket.session_id.clone(),
                    role: MessageRole::Psychologist,
                    content,
                    severity: None,
                },
                now.clone(),
            )?;
            if ticket.status == TicketStatus::Assigned {
                tx.execute(
                    "UPDATE escalation_tickets SET status = 'in_progress', updated_at = ?2
                     WHERE id = ?1 AND status = 'assigned'",
                    params![ticket_id, now],
                )?;
            }
            tx.commit()?;
            Ok(Some((message, ticket.status)))
        })
        .await
        .map_err(map_tr_err)
}

/// List tickets matching the filter, most severe first, then oldest first.
pub async fn list_tickets(
    db: &Database,
    filter: &TicketFilter,
) -> Result<Vec<Ticket>, SolaceError> {
    let mut clauses = Vec::new();
    let mut values: Vec<String> = Vec::new();

    if !filter.statuses.is_empty() {
        let start = values.len();
        values.extend(filter.statuses.iter().map(ToString::to_string));
        let placeholders = (start..values.len())
            .map(|i| format!("?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        clauses.push(format!("status IN ({placeholders})"));
    }
    if let Some(assignee) = &filter.assignee {
        values.push(assignee.clone());
        clauses.push(format!("assigned_psychologist_id = ?{}", values.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {TICKET_COLUMNS} FROM escalation_tickets{where_sql}
         ORDER BY severity DESC, created_at ASC, id ASC"
    );

    db.connection()
        .call(move |conn| -> Result<Vec<Ticket>, rusqlite::Error> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), ticket_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
