// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use solace_config::model::StorageConfig;
use solace_core::types::{
    Availability, Message, NewMessage, NewTicket, Session, Ticket, TicketFilter, TicketStatus,
};
use solace_core::{AdapterType, HealthStatus, PluginAdapter, SolaceError, StorageAdapter};

use crate::database::{Database, checkpoint, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules. The
/// database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, SolaceError> {
        self.db
            .get()
            .ok_or_else(|| SolaceError::storage("storage not initialized -- call initialize() first"))
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, SolaceError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT 1", [], |row| row.get(0))
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SolaceError> {
        if let Some(db) = self.db.get() {
            checkpoint(db.connection()).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), SolaceError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| SolaceError::storage("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), SolaceError> {
        checkpoint(self.db()?.connection()).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Sessions ---

    async fn ensure_session(
        &self,
        session_id: &str,
        user_id: Option<&str>,
    ) -> Result<Session, SolaceError> {
        queries::sessions::ensure_session(self.db()?, session_id, user_id).await
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, SolaceError> {
        queries::sessions::get_session(self.db()?, id).await
    }

    // --- Messages ---

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, SolaceError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, SolaceError> {
        queries::messages::recent_messages(self.db()?, session_id, limit).await
    }

    async fn messages_after(
        &self,
        session_id: &str,
        after: Option<&str>,
    ) -> Result<Vec<Message>, SolaceError> {
        queries::messages::messages_after(self.db()?, session_id, after).await
    }

    // --- Tickets ---

    async fn ensure_ticket(&self, ticket: &NewTicket) -> Result<(Ticket, bool), SolaceError> {
        queries::tickets::ensure_ticket(self.db()?, ticket).await
    }

    async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, SolaceError> {
        queries::tickets::get_ticket(self.db()?, id).await
    }

    async fn assign_ticket(&self, id: &str, psychologist_id: &str) -> Result<bool, SolaceError> {
        queries::tickets::assign_ticket(self.db()?, id, psychologist_id).await
    }

    async fn insert_ticket_reply(
        &self,
        ticket_id: &str,
        psychologist_id: &str,
        content: &str,
    ) -> Result<Option<(Message, TicketStatus)>, SolaceError> {
        queries::tickets::insert_ticket_reply(self.db()?, ticket_id, psychologist_id, content).await
    }

    async fn transition_ticket(
        &self,
        id: &str,
        from: &[TicketStatus],
        to: TicketStatus,
    ) -> Result<bool, SolaceError> {
        queries::tickets::transition_ticket(self.db()?, id, from, to).await
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, SolaceError> {
        queries::tickets::list_tickets(self.db()?, filter).await
    }

    // --- Availability ---

    async fn set_availability(
        &self,
        user_id: &str,
        is_available: bool,
    ) -> Result<(), SolaceError> {
        queries::availability::set_availability(self.db()?, user_id, is_available).await
    }

    async fn get_availability(&self, user_id: &str) -> Result<Option<Availability>, SolaceError> {
        queries::availability::get_availability(self.db()?, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use solace_core::types::Severity;
    use tempfile::tempdir;
    use tokio::task::JoinSet;

    use super::*;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    async fn initialized(dir: &tempfile::TempDir, name: &str) -> Arc<SqliteStorage> {
        let db_path = dir.path().join(name);
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        Arc::new(storage)
    }

    fn crisis_ticket() -> NewTicket {
        NewTicket {
            user_id: "u1".to_string(),
            session_id: "s1".to_string(),
            severity: Severity::MAX,
            summary: "AI support escalation: severity 5/5".to_string(),
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let storage = SqliteStorage::new(make_config("unused.db"));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir, "double.db").await;
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_check_tracks_initialization() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(storage.health_check().await.is_err());
        assert!(storage.ensure_session("s1", None).await.is_err());

        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        storage.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_ensure_ticket_creates_exactly_one() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir, "race.db").await;
        storage.ensure_session("s1", Some("u1")).await.unwrap();

        let mut set = JoinSet::new();
        for _ in 0..16 {
            let storage = Arc::clone(&storage);
            set.spawn(async move { storage.ensure_ticket(&crisis_ticket()).await.unwrap() });
        }

        let mut ids = Vec::new();
        let mut created = 0;
        while let Some(result) = set.join_next().await {
            let (ticket, was_created) = result.unwrap();
            ids.push(ticket.id);
            if was_created {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        ids.dedup();
        assert_eq!(ids.len(), 1, "every caller sees the same ticket");

        let active = storage
            .list_tickets(&TicketFilter {
                statuses: TicketStatus::ACTIVE.to_vec(),
                assignee: None,
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_pickup_has_one_winner() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir, "pickup.db").await;
        storage.ensure_session("s1", Some("u1")).await.unwrap();
        let (ticket, _) = storage.ensure_ticket(&crisis_ticket()).await.unwrap();

        let mut set = JoinSet::new();
        for i in 0..8 {
            let storage = Arc::clone(&storage);
            let id = ticket.id.clone();
            set.spawn(async move {
                let psych = format!("p{i}");
                let won = storage.assign_ticket(&id, &psych).await.unwrap();
                (psych, won)
            });
        }

        let mut winners = Vec::new();
        while let Some(result) = set.join_next().await {
            let (psych, won) = result.unwrap();
            if won {
                winners.push(psych);
            }
        }
        assert_eq!(winners.len(), 1);

        let stored = storage.get_ticket(&ticket.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TicketStatus::Assigned);
        assert_eq!(stored.assigned_psychologist_id.as_deref(), Some(winners[0].as_str()));
    }

    #[tokio::test]
    async fn full_escalation_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir, "lifecycle.db").await;

        storage.ensure_session("s1", Some("u1")).await.unwrap();
        storage
            .insert_message(&NewMessage {
                session_id: "s1".to_string(),
                role: solace_core::types::MessageRole::User,
                content: "I can't go on".to_string(),
                severity: None,
            })
            .await
            .unwrap();

        let (ticket, created) = storage.ensure_ticket(&crisis_ticket()).await.unwrap();
        assert!(created);
        assert!(storage.assign_ticket(&ticket.id, "p1").await.unwrap());
        assert!(
            storage
                .transition_ticket(&ticket.id, &[TicketStatus::Assigned], TicketStatus::InProgress)
                .await
                .unwrap()
        );
        assert!(
            storage
                .transition_ticket(
                    &ticket.id,
                    &[TicketStatus::Assigned, TicketStatus::InProgress],
                    TicketStatus::Resolved
                )
                .await
                .unwrap()
        );
        let (next, created) = storage.ensure_ticket(&crisis_ticket()).await.unwrap();
        assert!(created, "a resolved ticket is not reused");
        assert_ne!(next.id, ticket.id);

        storage.set_availability("p1", true).await.unwrap();
        assert!(storage.get_availability("p1").await.unwrap().unwrap().is_available);

        assert_eq!(storage.messages_after("s1", None).await.unwrap().len(), 1);
        storage.close().await.unwrap();
    }
}
