// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client side of the Solace support chat.
//!
//! [`LockController`] is the explicit state machine that switches a
//! conversation between AI mode and the locked, human-handled modes, and
//! reconciles with the server by polling ticket status. It talks to the
//! service through the [`ChatBackend`] seam; [`HttpChatBackend`] is the
//! production implementation.

pub mod backend;
pub mod controller;
pub mod http;

pub use backend::{ChatBackend, SharedToken, TokenSource};
pub use controller::{
    EntryKind, LockController, LockState, ReconcileExit, SendReport, TranscriptEntry,
};
pub use http::HttpChatBackend;
