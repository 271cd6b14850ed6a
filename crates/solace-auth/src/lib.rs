// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer token authentication for Solace.
//!
//! Stands in for the external auth provider: tokens carry the user id and an
//! explicit role claim, signed with a shared HMAC secret. The gateway forwards
//! bearer tokens here and only inspects the returned [`Identity`].

pub mod token;

use async_trait::async_trait;
use secrecy::SecretString;
use solace_config::model::AuthConfig;
use solace_config::validation::MIN_TOKEN_SECRET_LEN;
use solace_core::traits::{AuthAdapter, PluginAdapter};
use solace_core::types::{AdapterType, HealthStatus, Identity, Role};
use solace_core::SolaceError;
use tracing::debug;

pub use token::{Claims, TokenSigner};

/// [`AuthAdapter`] backed by HMAC-signed tokens.
#[derive(Debug)]
pub struct HmacTokenAuth {
    signer: TokenSigner,
    ttl_secs: i64,
}

impl HmacTokenAuth {
    pub fn new(secret: SecretString, ttl_hours: u64) -> Self {
        Self {
            signer: TokenSigner::new(secret),
            ttl_secs: i64::try_from(ttl_hours.saturating_mul(3600)).unwrap_or(i64::MAX),
        }
    }

    /// Build from the `[auth]` section. `token_secret` must be set.
    pub fn from_config(config: &AuthConfig) -> Result<Self, SolaceError> {
        let secret = config
            .token_secret
            .clone()
            .ok_or_else(|| SolaceError::Config("auth.token_secret is not set".into()))?;
        if secret.len() < MIN_TOKEN_SECRET_LEN {
            return Err(SolaceError::Config(format!(
                "auth.token_secret must be at least {MIN_TOKEN_SECRET_LEN} bytes"
            )));
        }
        Ok(Self::new(SecretString::from(secret), config.token_ttl_hours))
    }

    /// Mint a token for `user_id` with the configured lifetime.
    pub fn issue(&self, user_id: &str, role: Role) -> Result<String, SolaceError> {
        self.signer
            .issue(user_id, role, chrono::Utc::now().timestamp(), self.ttl_secs)
    }
}

#[async_trait]
impl PluginAdapter for HmacTokenAuth {
    fn name(&self) -> &str {
        "hmac-token"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Auth
    }

    async fn health_check(&self) -> Result<HealthStatus, SolaceError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SolaceError> {
        Ok(())
    }
}

#[async_trait]
impl AuthAdapter for HmacTokenAuth {
    async fn authenticate(&self, token: &str) -> Result<Identity, SolaceError> {
        let identity = self
            .signer
            .identify(token, chrono::Utc::now().timestamp())?;
        debug!(user_id = %identity.user_id, role = %identity.role, "token verified");
        Ok(identity)
    }
}
