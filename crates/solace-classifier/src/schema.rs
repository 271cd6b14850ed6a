// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response contract for the external classifier.
//!
//! The payload is checked against a JSON Schema before it is deserialized, so
//! an out-of-range severity or a missing field is rejected as a whole instead
//! of being coerced.

use jsonschema::Validator;
use serde_json::{Value, json};
use solace_core::{Classification, SolaceError};

/// JSON Schema for a classifier response body.
pub fn response_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["reply", "severity", "escalated"],
        "properties": {
            "reply": { "type": "string" },
            "severity": {
                "oneOf": [
                    { "type": "integer", "minimum": 0, "maximum": 5 },
                    { "type": "null" }
                ]
            },
            "escalated": { "type": "boolean" },
            "plan": {
                "type": "array",
                "items": { "type": "string" }
            },
            "tasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["title"],
                    "properties": {
                        "title": { "type": "string" },
                        "minutes": {
                            "oneOf": [
                                { "type": "integer", "minimum": 0 },
                                { "type": "null" }
                            ]
                        }
                    }
                }
            }
        }
    })
}

/// Compiled response validator.
pub struct ResponseValidator {
    validator: Validator,
}

impl ResponseValidator {
    pub fn new() -> Result<Self, SolaceError> {
        let validator = jsonschema::validator_for(&response_schema())
            .map_err(|e| SolaceError::Internal(format!("invalid classifier schema: {e}")))?;
        Ok(Self { validator })
    }

    /// Validate and convert a response body.
    ///
    /// All schema violations are reported together in the error message.
    pub fn parse(&self, body: &Value) -> Result<Classification, SolaceError> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(body)
            .map(|e| e.to_string())
            .collect();
        if !violations.is_empty() {
            return Err(SolaceError::classifier(format!(
                "response violates schema: {}",
                violations.join("; ")
            )));
        }

        serde_json::from_value(body.clone()).map_err(|e| SolaceError::Classifier {
            message: format!("failed to decode response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use solace_core::Severity;

    use super::*;

    fn validator() -> ResponseValidator {
        ResponseValidator::new().unwrap()
    }

    #[test]
    fn minimal_response_defaults_plan_and_tasks() {
        let body = json!({"reply": "ok", "severity": 2, "escalated": false});
        let parsed = validator().parse(&body).unwrap();
        assert_eq!(parsed.reply, "ok");
        assert_eq!(parsed.severity, Some(Severity::new(2).unwrap()));
        assert!(parsed.plan.is_empty());
        assert!(parsed.tasks.is_empty());
    }

    #[test]
    fn full_response_parses_tasks() {
        let body = json!({
            "reply": "Let's slow down together.",
            "severity": 3,
            "escalated": false,
            "plan": ["breathe", "drink water"],
            "tasks": [{"title": "box breathing", "minutes": 4}, {"title": "walk", "minutes": null}]
        });
        let parsed = validator().parse(&body).unwrap();
        assert_eq!(parsed.plan, vec!["breathe", "drink water"]);
        assert_eq!(parsed.tasks.len(), 2);
        assert_eq!(parsed.tasks[0].minutes, Some(4));
        assert_eq!(parsed.tasks[1].minutes, None);
    }

    #[test]
    fn null_severity_is_accepted() {
        let body = json!({"reply": "hm", "severity": null, "escalated": true});
        let parsed = validator().parse(&body).unwrap();
        assert!(parsed.severity.is_none());
        assert!(parsed.escalated);
    }

    #[test]
    fn out_of_range_severity_is_rejected() {
        let body = json!({"reply": "x", "severity": 7, "escalated": true});
        let err = validator().parse(&body).unwrap_err();
        assert_eq!(err.kind(), "classifier_unavailable");
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        for body in [
            json!({"severity": 1, "escalated": false}),
            json!({"reply": "x", "escalated": false}),
            json!({"reply": "x", "severity": 1}),
            json!({"reply": "x", "severity": "high", "escalated": false}),
            json!({"reply": "x", "severity": 1, "escalated": false, "tasks": [{"minutes": 3}]}),
        ] {
            assert!(validator().parse(&body).is_err(), "accepted {body}");
        }
    }
}
