// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end escalation tests.
//!
//! `TestHarness` assembles the escalation core over a temp SQLite database,
//! a [`MockClassifier`], and the real HMAC token adapter.

use std::sync::Arc;

use secrecy::SecretString;
use solace_auth::HmacTokenAuth;
use solace_config::model::{EscalationConfig, StorageConfig};
use solace_core::{AuthAdapter, Classification, Identity, Role, SolaceError, StorageAdapter};
use solace_escalation::{StaffDesk, SupportService};
use solace_storage::SqliteStorage;

use crate::local_backend::LocalBackend;
use crate::mock_classifier::{MockClassifier, Scripted};

/// Secret used for every harness-issued token.
pub const TEST_TOKEN_SECRET: &str = "test-secret-test-secret-test-secret!";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    script: Vec<Scripted>,
    escalation: EscalationConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            script: Vec::new(),
            escalation: EscalationConfig::default(),
        }
    }

    /// Queue classifier replies.
    pub fn with_classifications(mut self, replies: Vec<Classification>) -> Self {
        self.script.extend(replies.into_iter().map(Scripted::Reply));
        self
    }

    /// Queue arbitrary classifier results, including failures.
    pub fn with_script(mut self, script: Vec<Scripted>) -> Self {
        self.script.extend(script);
        self
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.escalation.severity_threshold = threshold;
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.escalation.history_window = window;
        self
    }

    /// Build the harness, creating the temp database and all services.
    pub async fn build(self) -> Result<TestHarness, SolaceError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| SolaceError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter + Send + Sync> = Arc::new(storage);

        let classifier = Arc::new(MockClassifier::with_script(self.script));
        let auth = Arc::new(HmacTokenAuth::new(
            SecretString::from(TEST_TOKEN_SECRET.to_string()),
            1,
        ));

        let support = SupportService::from_config(storage.clone(), classifier.clone(), &self.escalation)?;
        let staff = StaffDesk::new(storage.clone());

        Ok(TestHarness {
            storage,
            classifier,
            auth,
            support,
            staff,
            escalation: self.escalation,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete escalation environment with a mock classifier and temp storage.
pub struct TestHarness {
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<dyn StorageAdapter + Send + Sync>,
    pub classifier: Arc<MockClassifier>,
    pub auth: Arc<HmacTokenAuth>,
    pub support: SupportService,
    pub staff: StaffDesk,
    pub escalation: EscalationConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default settings and an empty classifier script.
    pub async fn new() -> Result<Self, SolaceError> {
        Self::builder().build().await
    }

    /// Mint a bearer token the harness auth adapter accepts.
    pub fn token(&self, user_id: &str, role: Role) -> Result<String, SolaceError> {
        self.auth.issue(user_id, role)
    }

    pub fn user(&self, user_id: &str) -> Identity {
        Identity::new(user_id, Role::User)
    }

    pub fn psychologist(&self, user_id: &str) -> Identity {
        Identity::new(user_id, Role::Psychologist)
    }

    pub fn admin(&self, user_id: &str) -> Identity {
        Identity::new(user_id, Role::Admin)
    }

    /// An in-process chat backend over this harness's support service.
    pub fn backend(&self) -> Arc<LocalBackend> {
        let auth: Arc<dyn AuthAdapter + Send + Sync> = self.auth.clone();
        Arc::new(LocalBackend::new(self.support.clone(), auth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_classifier::crisis;

    #[tokio::test]
    async fn harness_escalates_authenticated_crisis() {
        let harness = TestHarness::builder()
            .with_classifications(vec![crisis()])
            .build()
            .await
            .unwrap();
        let alice = harness.user("alice");
        let outcome = harness
            .support
            .send_message(Some(&alice), None, "I want to end it all")
            .await
            .unwrap();
        assert!(outcome.escalated);
        assert!(outcome.ticket_id.is_some());
        assert_eq!(harness.classifier.call_count(), 1);
    }

    #[tokio::test]
    async fn harness_tokens_round_trip_through_auth() {
        let harness = TestHarness::new().await.unwrap();
        let token = harness.token("p1", Role::Psychologist).unwrap();
        let identity = harness.auth.authenticate(&token).await.unwrap();
        assert_eq!(identity, harness.psychologist("p1"));
    }
}
