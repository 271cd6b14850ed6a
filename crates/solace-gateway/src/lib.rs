// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Solace escalation service.
//!
//! Exposes the end-user surface (send, direct append, request a human,
//! ticket status, transcript) and the staff surface (queue, pickup, reply,
//! end, close, availability) over axum. Credentials are forwarded to the
//! auth adapter; role and ownership checks happen in the escalation core.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{GatewayState, HealthState, ServerConfig, build_router, start_server};
