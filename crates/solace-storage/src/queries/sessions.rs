// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session upsert and lookup.

use rusqlite::{OptionalExtension, params};
use solace_core::SolaceError;

use crate::database::{Database, map_tr_err};
use crate::models::{Session, timestamp};

const SESSION_COLUMNS: &str = "id, user_id, created_at, updated_at";

fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        user_id: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

/// Insert the session if missing and return the stored row.
///
/// An existing session without an owner is claimed by `user_id`. An owned
/// session keeps its owner; callers compare the returned `user_id`.
pub async fn ensure_session(
    db: &Database,
    session_id: &str,
    user_id: Option<&str>,
) -> Result<Session, SolaceError> {
    let id = session_id.to_string();
    let user_id = user_id.map(str::to_string);
    let now = timestamp();
    db.connection()
        .call(move |conn| -> Result<Session, rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO sessions (id, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                     user_id = COALESCE(sessions.user_id, excluded.user_id),
                     updated_at = CASE
                         WHEN sessions.user_id IS NULL AND excluded.user_id IS NOT NULL
                         THEN excluded.updated_at
                         ELSE sessions.updated_at
                     END",
                params![id, user_id, now],
            )?;
            let session = tx.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
                params![id],
                session_from_row,
            )?;
            tx.commit()?;
            Ok(session)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<Session>, SolaceError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Session>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
                params![id],
                session_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}
