// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication adapter trait.

use async_trait::async_trait;

use crate::error::SolaceError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Identity;

/// Resolves a caller-supplied bearer credential to a verified identity.
///
/// The escalation core never inspects credentials itself; it forwards them
/// here and trusts the role claim that comes back.
#[async_trait]
pub trait AuthAdapter: PluginAdapter {
    /// Returns `SolaceError::Unauthorized` for missing, malformed, or expired tokens.
    async fn authenticate(&self, token: &str) -> Result<Identity, SolaceError>;
}
