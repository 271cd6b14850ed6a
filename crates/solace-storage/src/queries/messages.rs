// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only message log operations.

use rusqlite::{Connection, OptionalExtension, params};
use solace_core::SolaceError;

use crate::database::{Database, map_tr_err};
use crate::models::{Message, NewMessage, Severity, parse_severity, parse_text, timestamp};

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: parse_text(2, row.get(2)?)?,
        content: row.get(3)?,
        severity: row
            .get::<_, Option<u8>>(4)?
            .map(|v| parse_severity(4, v))
            .transpose()?,
        created_at: row.get(5)?,
    })
}

/// Append a message, assigning its id and timestamp.
///
/// `created_at` never goes below the latest timestamp already in the session,
/// so log order survives clock steps backwards.
pub async fn insert_message(db: &Database, msg: &NewMessage) -> Result<Message, SolaceError> {
    let msg = msg.clone();
    let id = uuid::Uuid::new_v4().to_string();
    let now = timestamp();
    db.connection()
        .call(move |conn| -> Result<Message, rusqlite::Error> {
            let tx = conn.transaction()?;
            let message = append_row(&tx, id, msg, now)?;
            tx.commit()?;
            Ok(message)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert one message row inside the caller's transaction.
pub(crate) fn append_row(
    conn: &Connection,
    id: String,
    msg: NewMessage,
    now: String,
) -> rusqlite::Result<Message> {
    let latest: Option<String> = conn.query_row(
        "SELECT MAX(created_at) FROM messages WHERE session_id = ?1",
        params![msg.session_id],
        |row| row.get(0),
    )?;
    let created_at = match latest {
        Some(latest) if latest > now => latest,
        _ => now,
    };
    conn.execute(
        "INSERT INTO messages (id, session_id, role, content, severity, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            msg.session_id,
            msg.role.to_string(),
            msg.content,
            msg.severity.map(Severity::value),
            created_at,
        ],
    )?;
    conn.execute(
        "UPDATE sessions SET updated_at = ?2 WHERE id = ?1",
        params![msg.session_id, created_at],
    )?;
    Ok(Message {
        id,
        session_id: msg.session_id,
        role: msg.role,
        content: msg.content,
        severity: msg.severity,
        created_at,
    })
}

/// The `limit` most recent messages of a session, returned oldest first.
pub async fn recent_messages(
    db: &Database,
    session_id: &str,
    limit: usize,
) -> Result<Vec<Message>, SolaceError> {
    let session_id = session_id.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, role, content, severity, created_at FROM (
                     SELECT id, session_id, role, content, severity, created_at, rowid AS seq
                     FROM messages WHERE session_id = ?1
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?2
                 )
                 ORDER BY created_at ASC, seq ASC",
            )?;
            let rows = stmt.query_map(params![session_id, limit], message_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Messages ordered after the message `after`, oldest first.
///
/// The cursor is resolved to its `(created_at, rowid)` position, so messages
/// sharing a timestamp with it are not skipped. A missing cursor returns
/// the whole session.
pub async fn messages_after(
    db: &Database,
    session_id: &str,
    after: Option<&str>,
) -> Result<Vec<Message>, SolaceError> {
    let session_id = session_id.to_string();
    let after = after.map(str::to_string);
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let cursor: Option<(String, i64)> = match &after {
                Some(id) => conn
                    .query_row(
                        "SELECT created_at, rowid FROM messages WHERE id = ?1 AND session_id = ?2",
                        params![id, session_id],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?,
                None => None,
            };
            let (cursor_ts, cursor_seq) = cursor.unwrap_or_default();

            let mut stmt = conn.prepare(
                "SELECT id, session_id, role, content, severity, created_at
                 FROM messages
                 WHERE session_id = ?1
                   AND (created_at > ?2 OR (created_at = ?2 AND rowid > ?3))
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![session_id, cursor_ts, cursor_seq], message_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;
    use crate::queries::sessions::ensure_session;
    use crate::queries::test_support::setup_db;

    fn new_message(session_id: &str, role: MessageRole, content: &str) -> NewMessage {
        NewMessage {
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            severity: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let (db, _dir) = setup_db().await;
        ensure_session(&db, "s1", Some("u1")).await.unwrap();

        let mut msg = new_message("s1", MessageRole::Assistant, "I hear you.");
        msg.severity = Some(Severity::new(3).unwrap());
        let stored = insert_message(&db, &msg).await.unwrap();

        assert!(!stored.id.is_empty());
        assert!(stored.created_at.ends_with('Z'));
        assert_eq!(stored.severity, Some(Severity::new(3).unwrap()));

        let all = messages_after(&db, "s1", None).await.unwrap();
        assert_eq!(all, vec![stored]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recent_messages_returns_last_twenty_oldest_first() {
        let (db, _dir) = setup_db().await;
        ensure_session(&db, "s1", Some("u1")).await.unwrap();

        for i in 0..25 {
            let role = if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            };
            insert_message(&db, &new_message("s1", role, &format!("m{i}")))
                .await
                .unwrap();
        }

        let recent = recent_messages(&db, "s1", 20).await.unwrap();
        assert_eq!(recent.len(), 20);
        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        let expected: Vec<String> = (5..25).map(|i| format!("m{i}")).collect();
        assert_eq!(contents, expected);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn timestamps_never_decrease_within_session() {
        let (db, _dir) = setup_db().await;
        ensure_session(&db, "s1", Some("u1")).await.unwrap();

        // A row stamped in the future stands in for a clock that stepped back.
        db.connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "INSERT INTO messages (id, session_id, role, content, created_at)
                     VALUES ('future', 's1', 'user', 'early', '2999-01-01T00:00:00.000Z')",
                    [],
                )
            })
            .await
            .unwrap();

        let next = insert_message(&db, &new_message("s1", MessageRole::Assistant, "later"))
            .await
            .unwrap();
        assert_eq!(next.created_at, "2999-01-01T00:00:00.000Z");

        let ordered = messages_after(&db, "s1", None).await.unwrap();
        assert_eq!(ordered[0].id, "future");
        assert_eq!(ordered[1].id, next.id);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn messages_after_cursor_skips_seen_rows() {
        let (db, _dir) = setup_db().await;
        ensure_session(&db, "s1", Some("u1")).await.unwrap();

        let a = insert_message(&db, &new_message("s1", MessageRole::User, "a"))
            .await
            .unwrap();
        let b = insert_message(&db, &new_message("s1", MessageRole::Psychologist, "b"))
            .await
            .unwrap();
        let c = insert_message(&db, &new_message("s1", MessageRole::User, "c"))
            .await
            .unwrap();

        let after_a = messages_after(&db, "s1", Some(&a.id)).await.unwrap();
        assert_eq!(after_a, vec![b, c.clone()]);

        let after_c = messages_after(&db, "s1", Some(&c.id)).await.unwrap();
        assert!(after_c.is_empty());

        let unknown = messages_after(&db, "s1", Some("not-a-message")).await.unwrap();
        assert_eq!(unknown.len(), 3);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let (db, _dir) = setup_db().await;
        ensure_session(&db, "s1", Some("u1")).await.unwrap();
        ensure_session(&db, "s2", Some("u2")).await.unwrap();

        insert_message(&db, &new_message("s1", MessageRole::User, "one"))
            .await
            .unwrap();
        insert_message(&db, &new_message("s2", MessageRole::User, "two"))
            .await
            .unwrap();

        let s1 = recent_messages(&db, "s1", 20).await.unwrap();
        assert_eq!(s1.len(), 1);
        assert_eq!(s1[0].content, "one");
        db.close().await.unwrap();
    }
}
