// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Advisory psychologist availability flags.

use rusqlite::{OptionalExtension, params};
use solace_core::SolaceError;

use crate::database::{Database, map_tr_err};
use crate::models::{Availability, timestamp};

/// Upsert the availability flag for a psychologist.
pub async fn set_availability(
    db: &Database,
    user_id: &str,
    is_available: bool,
) -> Result<(), SolaceError> {
    let user_id = user_id.to_string();
    let now = timestamp();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO psychologist_availability (user_id, is_available, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET
                     is_available = excluded.is_available,
                     updated_at = excluded.updated_at",
                params![user_id, is_available, now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_availability(
    db: &Database,
    user_id: &str,
) -> Result<Option<Availability>, SolaceError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Availability>, rusqlite::Error> {
            conn.query_row(
                "SELECT user_id, is_available, updated_at
                 FROM psychologist_availability WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(Availability {
                        user_id: row.get(0)?,
                        is_available: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::setup_db;

    #[tokio::test]
    async fn set_and_toggle_availability() {
        let (db, _dir) = setup_db().await;
        assert!(get_availability(&db, "p1").await.unwrap().is_none());

        set_availability(&db, "p1", false).await.unwrap();
        let a = get_availability(&db, "p1").await.unwrap().unwrap();
        assert!(!a.is_available);

        set_availability(&db, "p1", true).await.unwrap();
        let a = get_availability(&db, "p1").await.unwrap().unwrap();
        assert!(a.is_available);
        db.close().await.unwrap();
    }
}
