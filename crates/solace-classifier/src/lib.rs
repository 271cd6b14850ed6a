// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP adapter for the external severity classifier.
//!
//! Implements [`ClassifierAdapter`] by POSTing `{message, history}` to the
//! configured endpoint. Every failure mode (transport error, timeout, non-2xx,
//! malformed or schema-violating body) becomes `SolaceError::Classifier` so the
//! caller never mistakes an outage for a low-severity reply.

pub mod schema;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use solace_config::model::ClassifierConfig;
use solace_core::traits::{ClassifierAdapter, PluginAdapter};
use solace_core::types::{AdapterType, Classification, ClassifierRequest, HealthStatus};
use solace_core::SolaceError;
use tracing::{debug, info, warn};

use crate::schema::ResponseValidator;

/// Classifier reachable over HTTP.
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    validator: ResponseValidator,
}

impl HttpClassifier {
    /// Build the adapter from configuration. `endpoint` must be set.
    pub fn new(config: &ClassifierConfig) -> Result<Self, SolaceError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| SolaceError::Config("classifier.endpoint is not set".into()))?;
        let timeout = Duration::from_millis(config.timeout_ms);

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| SolaceError::Config(format!("invalid classifier api key: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SolaceError::Classifier {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(endpoint = %endpoint, timeout_ms = config.timeout_ms, "classifier adapter initialized");

        Ok(Self {
            client,
            endpoint,
            timeout,
            validator: ResponseValidator::new()?,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> SolaceError {
        let message = if e.is_timeout() {
            format!("no response within {}ms", self.timeout.as_millis())
        } else {
            format!("request failed: {e}")
        };
        SolaceError::Classifier {
            message,
            source: Some(Box::new(e)),
        }
    }
}

#[async_trait]
impl PluginAdapter for HttpClassifier {
    fn name(&self) -> &str {
        "http-classifier"
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
impl ClassifierAdapter for HttpClassifier {
    async fn classify(&self, request: &ClassifierRequest) -> Result<Classification, SolaceError> {
        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        debug!(status = %status, history = request.history.len(), "classifier responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "classifier returned an error status");
            return Err(SolaceError::classifier(format!(
                "classifier returned {status}"
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                SolaceError::Classifier {
                    message: format!("response is not valid JSON: {e}"),
                    source: Some(Box::new(e)),
                }
            }
        })?;

        let classification = self.validator.parse(&body)?;
        debug!(
            severity = ?classification.severity.map(|s| s.value()),
            escalated = classification.escalated,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "classification received"
        );
        Ok(classification)
    }
}
