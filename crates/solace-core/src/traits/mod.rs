// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators the core talks to.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod auth;
pub mod classifier;
pub mod storage;

pub use adapter::PluginAdapter;
pub use auth::AuthAdapter;
pub use classifier::ClassifierAdapter;
pub use storage::StorageAdapter;
