// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed bearer token format.
//!
//! A token is `base64url(claims JSON) "." hex(HMAC-SHA256(secret, first part))`.
//! The role travels as an explicit claim; nothing is inferred from the subject.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use solace_core::types::{Identity, Role};
use solace_core::SolaceError;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role: Role,
    /// Expiry as unix seconds.
    pub exp: i64,
}

/// Issues and verifies tokens with a shared secret.
pub struct TokenSigner {
    secret: SecretString,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenSigner {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self) -> Result<HmacSha256, SolaceError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| SolaceError::Internal(format!("invalid hmac key: {e}")))
    }

    /// Sign `claims` into a token string.
    pub fn sign(&self, claims: &Claims) -> Result<String, SolaceError> {
        let json = serde_json::to_vec(claims)
            .map_err(|e| SolaceError::Internal(format!("failed to encode claims: {e}")))?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    /// Issue a token for `user_id` valid for `ttl_secs` from `now`.
    pub fn issue(
        &self,
        user_id: &str,
        role: Role,
        now: i64,
        ttl_secs: i64,
    ) -> Result<String, SolaceError> {
        self.sign(&Claims {
            sub: user_id.to_string(),
            role,
            exp: now.saturating_add(ttl_secs),
        })
    }

    /// Verify a token's signature and expiry against `now` (unix seconds).
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, SolaceError> {
        let (payload, signature) = token
            .split_once('.')
            .ok_or_else(|| unauthorized("malformed token"))?;

        let signature = hex::decode(signature).map_err(|_| unauthorized("malformed signature"))?;
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| unauthorized("bad signature"))?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| unauthorized("malformed claims"))?;
        let claims: Claims =
            serde_json::from_slice(&json).map_err(|_| unauthorized("malformed claims"))?;

        if claims.sub.trim().is_empty() {
            return Err(unauthorized("empty subject"));
        }
        if claims.exp <= now {
            return Err(unauthorized("token expired"));
        }
        Ok(claims)
    }

    /// Verify and convert straight into an [`Identity`].
    pub fn identify(&self, token: &str, now: i64) -> Result<Identity, SolaceError> {
        let claims = self.verify(token, now)?;
        Ok(Identity::new(claims.sub, claims.role))
    }
}

fn unauthorized(reason: &str) -> SolaceError {
    SolaceError::Unauthorized(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_800_000_000;

    fn signer(secret: &str) -> TokenSigner {
        TokenSigner::new(SecretString::from(secret.to_string()))
    }

    #[test]
    fn issued_token_verifies() {
        let s = signer("0123456789abcdef0123456789abcdef");
        let token = s.issue("alice", Role::Psychologist, NOW, 3600).unwrap();
        let claims = s.verify(&token, NOW + 10).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::Psychologist);
        assert_eq!(claims.exp, NOW + 3600);
    }

    #[test]
    fn expired_token_rejected() {
        let s = signer("0123456789abcdef0123456789abcdef");
        let token = s.issue("alice", Role::User, NOW, 60).unwrap();
        let err = s.verify(&token, NOW + 60).unwrap_err();
        assert_eq!(err.kind(), "unauthorized");
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn tampered_claims_rejected() {
        let s = signer("0123456789abcdef0123456789abcdef");
        let token = s.issue("alice", Role::User, NOW, 3600).unwrap();
        let (_, sig) = token.split_once('.').unwrap();

        let forged = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&Claims {
                sub: "alice".into(),
                role: Role::Admin,
                exp: NOW + 3600,
            })
            .unwrap(),
        );
        let err = s.verify(&format!("{forged}.{sig}"), NOW).unwrap_err();
        assert!(err.to_string().contains("bad signature"));
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = signer("0123456789abcdef0123456789abcdef")
            .issue("alice", Role::User, NOW, 3600)
            .unwrap();
        let other = signer("fedcba9876543210fedcba9876543210");
        assert!(other.verify(&token, NOW).is_err());
    }

    #[test]
    fn garbage_rejected() {
        let s = signer("0123456789abcdef0123456789abcdef");
        for token in ["", "no-dot", "abc.zz", ".", "e30.00"] {
            let err = s.verify(token, NOW).unwrap_err();
            assert_eq!(err.kind(), "unauthorized", "token {token:?}");
        }
    }

    #[test]
    fn debug_redacts_secret() {
        let s = signer("super-secret-value-that-is-long-enough");
        assert!(!format!("{s:?}").contains("super-secret"));
    }
}
