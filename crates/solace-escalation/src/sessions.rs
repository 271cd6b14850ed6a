// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session store: guarantees a session row exists before anything references it.

use std::sync::Arc;

use solace_core::{Capability, Identity, Session, SolaceError, StorageAdapter};
use tracing::{debug, warn};

/// Longest caller-supplied session id accepted.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Generate a fresh server-side session id.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Caller-supplied ids must be 1-128 characters of `[A-Za-z0-9_-]`.
pub fn validate_session_id(session_id: &str) -> Result<(), SolaceError> {
    if session_id.is_empty() || session_id.len() > MAX_SESSION_ID_LEN {
        return Err(SolaceError::InvalidInput(format!(
            "session id must be 1 to {MAX_SESSION_ID_LEN} characters"
        )));
    }
    if !session_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(SolaceError::InvalidInput(
            "session id may only contain letters, digits, '-' and '_'".into(),
        ));
    }
    Ok(())
}

/// Ensures and authorizes access to conversation sessions.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn StorageAdapter + Send + Sync>) -> Self {
        Self { storage }
    }

    /// Idempotently upsert the session and check the caller may write to it.
    ///
    /// An anonymous session is claimed by the first authenticated caller.
    /// Storage failures become `SessionNotReady`; the caller must not go on
    /// to write messages or tickets for this turn.
    pub async fn ensure(
        &self,
        session_id: &str,
        caller: Option<&Identity>,
    ) -> Result<Session, SolaceError> {
        validate_session_id(session_id)?;
        let user_id = caller.map(|identity| identity.user_id.as_str());
        let session = self
            .storage
            .ensure_session(session_id, user_id)
            .await
            .map_err(|e| {
                warn!(session_id, error = %e, "session upsert failed");
                SolaceError::SessionNotReady {
                    session_id: session_id.to_string(),
                    source: Box::new(e),
                }
            })?;
        check_writer(&session, caller)?;
        debug!(session_id, owner = ?session.user_id, "session ensured");
        Ok(session)
    }

    /// Load an existing session the caller owns.
    pub async fn owned(&self, session_id: &str, caller: &Identity) -> Result<Session, SolaceError> {
        let session = self.get(session_id).await?;
        match &session.user_id {
            Some(owner) if owner == &caller.user_id => Ok(session),
            _ => Err(SolaceError::Forbidden(format!(
                "session {session_id} does not belong to the caller"
            ))),
        }
    }

    /// Load an existing session the caller owns, or any session for admins.
    pub async fn readable(
        &self,
        session_id: &str,
        caller: &Identity,
    ) -> Result<Session, SolaceError> {
        if caller.can(Capability::ManageTickets) {
            return self.get(session_id).await;
        }
        self.owned(session_id, caller).await
    }

    async fn get(&self, session_id: &str) -> Result<Session, SolaceError> {
        self.storage
            .get_session(session_id)
            .await?
            .ok_or_else(|| SolaceError::NotFound {
                entity: "session",
                id: session_id.to_string(),
            })
    }
}

fn check_writer(session: &Session, caller: Option<&Identity>) -> Result<(), SolaceError> {
    match (&session.user_id, caller) {
        (Some(owner), Some(identity)) if owner != &identity.user_id => Err(
            SolaceError::Forbidden(format!("session {} belongs to another user", session.id)),
        ),
        (Some(_), None) => Err(SolaceError::Unauthorized(format!(
            "session {} requires authentication",
            session.id
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solace_core::Role;

    fn session(owner: Option<&str>) -> Session {
        Session {
            id: "s1".into(),
            user_id: owner.map(str::to_string),
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn generated_ids_pass_validation() {
        let id = new_session_id();
        validate_session_id(&id).unwrap();
        assert_ne!(id, new_session_id());
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("has space").is_err());
        assert!(validate_session_id("../etc").is_err());
        assert!(validate_session_id(&"a".repeat(MAX_SESSION_ID_LEN + 1)).is_err());
        validate_session_id(&"a".repeat(MAX_SESSION_ID_LEN)).unwrap();
        validate_session_id("chat_2026-01").unwrap();
    }

    #[test]
    fn writer_checks() {
        let alice = Identity::new("alice", Role::User);
        let bob = Identity::new("bob", Role::User);

        check_writer(&session(None), None).unwrap();
        check_writer(&session(None), Some(&alice)).unwrap();
        check_writer(&session(Some("alice")), Some(&alice)).unwrap();

        let err = check_writer(&session(Some("alice")), Some(&bob)).unwrap_err();
        assert_eq!(err.kind(), "forbidden");
        let err = check_writer(&session(Some("alice")), None).unwrap_err();
        assert_eq!(err.kind(), "unauthorized");
    }
}
