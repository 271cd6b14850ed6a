// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Severity classifier adapter trait.

use async_trait::async_trait;

use crate::error::SolaceError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Classification, ClassifierRequest};

/// Adapter for the external model that replies to users and scores severity.
///
/// Implementations must return `SolaceError::Classifier` for timeouts, non-2xx
/// responses, and payloads that fail validation. A failure is never reported
/// as a low-severity success.
#[async_trait]
pub trait ClassifierAdapter: PluginAdapter {
    async fn classify(&self, request: &ClassifierRequest) -> Result<Classification, SolaceError>;
}
