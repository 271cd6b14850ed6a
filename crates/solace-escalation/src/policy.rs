// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation policy: turns a classifier result into a lock/ticket decision.
//!
//! The classifier's `escalated` flag is advisory. A scored message escalates
//! only when its severity reaches the threshold. An unscored message that the
//! classifier flagged is escalated at the threshold severity, so a crisis
//! signal without a number is never dropped.

use solace_config::model::EscalationConfig;
use solace_core::{Classification, Severity, SolaceError};

/// Outcome of applying the policy to one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub escalate: bool,
    /// Severity to record on a ticket. `None` only when not escalating an unscored reply.
    pub severity: Option<Severity>,
}

/// Threshold-based escalation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    threshold: Severity,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::new(Severity::MAX)
    }
}

impl EscalationPolicy {
    pub fn new(threshold: Severity) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &EscalationConfig) -> Result<Self, SolaceError> {
        Severity::new(config.severity_threshold)
            .map(Self::new)
            .map_err(|e| SolaceError::Config(format!("escalation.severity_threshold: {e}")))
    }

    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    pub fn decide(&self, classification: &Classification) -> Decision {
        match classification.severity {
            Some(severity) => Decision {
                escalate: severity >= self.threshold,
                severity: Some(severity),
            },
            None if classification.escalated => Decision {
                escalate: true,
                severity: Some(self.threshold),
            },
            None => Decision {
                escalate: false,
                severity: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(severity: Option<u8>, escalated: bool) -> Classification {
        Classification {
            reply: "I'm here with you.".into(),
            severity: severity.map(|v| Severity::new(v).unwrap()),
            escalated,
            plan: vec![],
            tasks: vec![],
        }
    }

    #[test]
    fn only_max_severity_escalates_by_default() {
        let policy = EscalationPolicy::default();
        for v in 0..5 {
            assert!(!policy.decide(&classification(Some(v), false)).escalate, "{v}");
        }
        let decision = policy.decide(&classification(Some(5), true));
        assert!(decision.escalate);
        assert_eq!(decision.severity, Some(Severity::MAX));
    }

    #[test]
    fn medium_severity_with_flag_does_not_lock() {
        let policy = EscalationPolicy::default();
        let decision = policy.decide(&classification(Some(4), true));
        assert!(!decision.escalate);
        assert_eq!(decision.severity.map(Severity::level), Some(solace_core::SeverityLevel::Medium));
    }

    #[test]
    fn high_severity_escalates_without_classifier_flag() {
        let decision = EscalationPolicy::default().decide(&classification(Some(5), false));
        assert!(decision.escalate);
    }

    #[test]
    fn unscored_flag_escalates_at_threshold() {
        let policy = EscalationPolicy::new(Severity::new(4).unwrap());
        let decision = policy.decide(&classification(None, true));
        assert!(decision.escalate);
        assert_eq!(decision.severity, Some(Severity::new(4).unwrap()));

        let quiet = policy.decide(&classification(None, false));
        assert!(!quiet.escalate);
        assert_eq!(quiet.severity, None);
    }

    #[test]
    fn lower_threshold_from_config() {
        let config = EscalationConfig {
            severity_threshold: 3,
            ..EscalationConfig::default()
        };
        let policy = EscalationPolicy::from_config(&config).unwrap();
        assert!(policy.decide(&classification(Some(3), false)).escalate);
    }

    #[test]
    fn out_of_range_threshold_is_config_error() {
        let config = EscalationConfig {
            severity_threshold: 9,
            ..EscalationConfig::default()
        };
        let err = EscalationPolicy::from_config(&config).unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
