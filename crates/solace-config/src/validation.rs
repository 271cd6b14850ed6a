// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: value ranges, bind
//! addresses, URL schemes, and secret length.

use crate::diagnostic::ConfigError;
use crate::model::SolaceConfig;

/// Highest severity the classifier can report.
const MAX_SEVERITY: u8 = 5;

/// Minimum polling interval for locked clients.
const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Minimum HMAC secret length in bytes.
pub const MIN_TOKEN_SECRET_LEN: usize = 32;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first one.
pub fn validate_config(config: &SolaceConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::validation(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if let Some(endpoint) = &config.classifier.endpoint
        && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        errors.push(ConfigError::validation(format!(
            "classifier.endpoint `{endpoint}` must be an http:// or https:// URL"
        )));
    }

    if config.classifier.timeout_ms == 0 {
        errors.push(ConfigError::validation(
            "classifier.timeout_ms must be at least 1",
        ));
    }

    if config.escalation.severity_threshold > MAX_SEVERITY {
        errors.push(ConfigError::validation(format!(
            "escalation.severity_threshold must be between 0 and {MAX_SEVERITY}, got {}",
            config.escalation.severity_threshold
        )));
    }

    if config.escalation.history_window == 0 {
        errors.push(ConfigError::validation(
            "escalation.history_window must be at least 1",
        ));
    }

    if config.escalation.poll_interval_ms < MIN_POLL_INTERVAL_MS {
        errors.push(ConfigError::validation(format!(
            "escalation.poll_interval_ms must be at least {MIN_POLL_INTERVAL_MS}, got {}",
            config.escalation.poll_interval_ms
        )));
    }

    if let Some(secret) = &config.auth.token_secret
        && secret.len() < MIN_TOKEN_SECRET_LEN
    {
        errors.push(ConfigError::validation(format!(
            "auth.token_secret must be at least {MIN_TOKEN_SECRET_LEN} bytes"
        )));
    }

    if config.auth.token_ttl_hours == 0 {
        errors.push(ConfigError::validation(
            "auth.token_ttl_hours must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: &[ConfigError]) -> Vec<String> {
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&SolaceConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = SolaceConfig::default();
        config.storage.database_path = " ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(messages(&errors)[0].contains("storage.database_path"));
    }

    #[test]
    fn threshold_above_five_rejected() {
        let mut config = SolaceConfig::default();
        config.escalation.severity_threshold = 6;
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("severity_threshold"));
    }

    #[test]
    fn threshold_zero_is_allowed() {
        let mut config = SolaceConfig::default();
        config.escalation.severity_threshold = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn non_http_endpoint_rejected() {
        let mut config = SolaceConfig::default();
        config.classifier.endpoint = Some("ftp://classifier.local".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("classifier.endpoint"));
    }

    #[test]
    fn short_secret_rejected() {
        let mut config = SolaceConfig::default();
        config.auth.token_secret = Some("short".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("auth.token_secret"));
    }

    #[test]
    fn all_failures_collected() {
        let mut config = SolaceConfig::default();
        config.gateway.host = "bad host!".to_string();
        config.escalation.history_window = 0;
        config.escalation.poll_interval_ms = 10;
        config.classifier.timeout_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn escalation_section_from_toml_validates() {
        let toml_str = r#"
[escalation]
severity_threshold = 3

[classifier]
endpoint = "http://localhost:9000/classify"
timeout_ms = 2000
"#;
        let config: SolaceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.escalation.severity_threshold, 3);
        assert_eq!(config.classifier.timeout_ms, 2000);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn toml_with_ftp_endpoint_fails_validation() {
        let toml_str = r#"
[classifier]
endpoint = "ftp://classifier.local"
"#;
        let config: SolaceConfig = toml::from_str(toml_str).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(messages(&errors)[0].contains("classifier.endpoint"));
    }

    #[test]
    fn escalation_denies_unknown_fields() {
        let toml_str = r#"
[escalation]
threshold = 3
"#;
        assert!(toml::from_str::<SolaceConfig>(toml_str).is_err());
    }
}
