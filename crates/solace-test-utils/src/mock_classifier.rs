// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted classifier double with call counting.
//!
//! Results are popped from a FIFO queue. When the queue is empty a calm,
//! severity-0 reply is returned.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use solace_core::types::{AdapterType, HealthStatus, PlannedTask};
use solace_core::{Classification, ClassifierAdapter, ClassifierRequest, PluginAdapter, Severity, SolaceError};

/// One scripted classifier result.
#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(Classification),
    /// Fails the way the HTTP adapter does when the endpoint does not answer in time.
    Timeout,
    /// Fails the way the HTTP adapter does on a non-2xx response.
    Unavailable(String),
}

/// Build a classification with the given severity and recommendation flag.
pub fn classification(reply: &str, severity: Option<u8>, escalated: bool) -> Classification {
    Classification {
        reply: reply.to_string(),
        severity: severity.and_then(|v| Severity::new(v).ok()),
        escalated,
        plan: Vec::new(),
        tasks: Vec::new(),
    }
}

/// A crisis-level classification: severity 5, escalated.
pub fn crisis() -> Classification {
    classification(
        "I'm really glad you told me. I'm bringing in someone from our team to talk with you.",
        Some(5),
        true,
    )
}

/// A low-severity reply with a small self-care plan.
pub fn calm(reply: &str) -> Classification {
    Classification {
        plan: vec!["Take a short walk".to_string()],
        tasks: vec![PlannedTask {
            title: "Breathing exercise".to_string(),
            minutes: Some(5),
        }],
        ..classification(reply, Some(1), false)
    }
}

/// A mock severity classifier returning pre-configured results.
pub struct MockClassifier {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ClassifierRequest>>,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_script(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(VecDeque::from(script)),
            ..Self::new()
        }
    }

    pub async fn push(&self, scripted: Scripted) {
        self.script.lock().await.push_back(scripted);
    }

    pub async fn push_reply(&self, classification: Classification) {
        self.push(Scripted::Reply(classification)).await;
    }

    /// Number of `classify` calls so far, including failed ones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in call order.
    pub async fn requests(&self) -> Vec<ClassifierRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn last_request(&self) -> Option<ClassifierRequest> {
        self.requests.lock().await.last().cloned()
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockClassifier {
    fn name(&self) -> &str {
        "mock-classifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, SolaceError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SolaceError> {
        Ok(())
    }
}

#[async_trait]
impl ClassifierAdapter for MockClassifier {
    async fn classify(&self, request: &ClassifierRequest) -> Result<Classification, SolaceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());
        let next = self.script.lock().await.pop_front();
        match next {
            Some(Scripted::Reply(classification)) => Ok(classification),
            Some(Scripted::Timeout) => Err(SolaceError::classifier("no response within 9000ms")),
            Some(Scripted::Unavailable(message)) => Err(SolaceError::classifier(message)),
            None => Ok(classification("mock reply", Some(0), false)),
        }
    }
}
