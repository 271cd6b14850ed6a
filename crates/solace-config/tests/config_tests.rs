// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Solace configuration system.

use std::path::Path;

use figment::Jail;
use solace_config::diagnostic::ConfigError;
use solace_config::{load_and_validate_str, load_config_from_path, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_solace_config() {
    let toml = r#"
[service]
name = "solace-test"
log_level = "debug"

[storage]
database_path = "/tmp/solace-test.db"
wal_mode = false

[gateway]
enabled = true
host = "0.0.0.0"
port = 8088

[classifier]
endpoint = "https://classifier.internal/v1/classify"
api_key = "ck-123"
timeout_ms = 4000

[escalation]
severity_threshold = 4
history_window = 12
poll_interval_ms = 1000

[auth]
token_secret = "0123456789abcdef0123456789abcdef"
token_ttl_hours = 2

[prometheus]
enabled = true
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.name, "solace-test");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/solace-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 8088);
    assert_eq!(
        config.classifier.endpoint.as_deref(),
        Some("https://classifier.internal/v1/classify")
    );
    assert_eq!(config.classifier.api_key.as_deref(), Some("ck-123"));
    assert_eq!(config.classifier.timeout_ms, 4000);
    assert_eq!(config.escalation.severity_threshold, 4);
    assert_eq!(config.escalation.history_window, 12);
    assert_eq!(config.escalation.poll_interval_ms, 1000);
    assert_eq!(config.auth.token_ttl_hours, 2);
    assert!(config.prometheus.enabled);
}

/// Missing sections fall back to defaults.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.service.name, "solace");
    assert_eq!(config.service.log_level, "info");
    assert!(config.storage.wal_mode);
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.gateway.port, 3000);
    assert!(config.classifier.endpoint.is_none());
    assert_eq!(config.classifier.timeout_ms, 9000);
    assert_eq!(config.escalation.severity_threshold, 5);
    assert_eq!(config.escalation.history_window, 20);
    assert_eq!(config.escalation.poll_interval_ms, 2500);
    assert!(config.auth.token_secret.is_none());
    assert_eq!(config.auth.token_ttl_hours, 12);
    assert!(!config.prometheus.enabled);
}

/// Unknown keys surface as diagnostics with a suggestion.
#[test]
fn unknown_key_produces_suggestion() {
    let toml = r#"
[escalation]
severity_treshold = 3
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "severity_treshold");
            assert_eq!(suggestion.as_deref(), Some("severity_threshold"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Wrong value types are reported as invalid type diagnostics.
#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[gateway]
port = "not-a-port"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject bad type");
    assert!(
        matches!(errors[0], ConfigError::InvalidType { .. }),
        "got {:?}",
        errors[0]
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn out_of_range_threshold_fails_validation() {
    let toml = r#"
[escalation]
severity_threshold = 9
"#;

    let errors = load_and_validate_str(toml).expect_err("threshold 9 is out of range");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
    assert!(errors[0].to_string().contains("severity_threshold"));
}

/// `SOLACE_*` variables override file values, keeping underscores inside field names.
#[test]
fn env_vars_override_file_values() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "solace.toml",
            r#"
[escalation]
poll_interval_ms = 1000

[classifier]
endpoint = "http://from-file"
"#,
        )?;
        jail.set_env("SOLACE_ESCALATION_POLL_INTERVAL_MS", "4000");
        jail.set_env("SOLACE_CLASSIFIER_API_KEY", "from-env");
        jail.set_env("SOLACE_AUTH_TOKEN_TTL_HOURS", "3");

        let config = load_config_from_path(Path::new("solace.toml"))?;
        assert_eq!(config.escalation.poll_interval_ms, 4000);
        assert_eq!(config.classifier.endpoint.as_deref(), Some("http://from-file"));
        assert_eq!(config.classifier.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.auth.token_ttl_hours, 3);
        Ok(())
    });
}

/// Missing config files are silently skipped.
#[test]
fn missing_config_file_silently_skipped() {
    Jail::expect_with(|_jail| {
        let config = load_config_from_path(Path::new("/nonexistent/solace.toml"))?;
        assert_eq!(config.service.name, "solace");
        Ok(())
    });
}
