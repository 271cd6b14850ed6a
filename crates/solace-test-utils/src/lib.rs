// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Solace integration tests.
//!
//! Provides a scripted classifier double, an in-process chat backend, and a
//! harness that wires the escalation core over a temp database, so tests run
//! without any external service.
//!
//! # Components
//!
//! - [`MockClassifier`] - scripted classifier with call counting
//! - [`LocalBackend`] - `ChatBackend` that calls the support service directly
//! - [`TestHarness`] - temp SQLite, mock classifier, and real token auth

pub mod harness;
pub mod local_backend;
pub mod mock_classifier;

pub use harness::{TEST_TOKEN_SECRET, TestHarness};
pub use local_backend::LocalBackend;
pub use mock_classifier::{MockClassifier, Scripted, calm, classification, crisis};
