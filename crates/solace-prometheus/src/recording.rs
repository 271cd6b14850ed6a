// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics. With no recorder installed the calls are no-ops.

use metrics::{describe_counter, describe_histogram};

/// Register all Solace metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("solace_messages_total", "Messages appended to the log, by role");
    describe_counter!(
        "solace_classifications_total",
        "Classifier calls, by outcome (ok, failure)"
    );
    describe_counter!(
        "solace_escalations_total",
        "Escalation decisions that reached the ticket manager, by whether a ticket was created"
    );
    describe_counter!(
        "solace_ticket_transitions_total",
        "Ticket status changes, by target status"
    );
    describe_histogram!(
        "solace_classifier_latency_seconds",
        "Severity classifier round-trip latency in seconds"
    );
}

/// Record a message appended to the log.
pub fn record_message(role: &str) {
    metrics::counter!("solace_messages_total", "role" => role.to_string()).increment(1);
}

/// Record the outcome of a classifier call.
pub fn record_classification(outcome: &'static str) {
    metrics::counter!("solace_classifications_total", "outcome" => outcome).increment(1);
}

/// Record an ensure-ticket call and whether it inserted a row.
pub fn record_escalation(created: bool) {
    let created = if created { "true" } else { "false" };
    metrics::counter!("solace_escalations_total", "created" => created).increment(1);
}

/// Record a ticket moving to `status`.
pub fn record_ticket_transition(status: &str) {
    metrics::counter!("solace_ticket_transitions_total", "to" => status.to_string()).increment(1);
}

/// Record classifier latency.
pub fn record_classifier_latency(seconds: f64) {
    metrics::histogram!("solace_classifier_latency_seconds").record(seconds);
}

#[cfg(test)]
mod tests {
    use metrics_exporter_prometheus::PrometheusBuilder;

    use super::*;

    #[test]
    fn recorded_metrics_render_with_labels() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            register_metrics();
            record_message("user");
            record_message("user");
            record_classification("failure");
            record_escalation(true);
            record_ticket_transition("assigned");
        });

        let rendered = handle.render();
        assert!(
            rendered.contains("solace_messages_total{role=\"user\"} 2"),
            "{rendered}"
        );
        assert!(rendered.contains("solace_classifications_total{outcome=\"failure\"} 1"));
        assert!(rendered.contains("solace_escalations_total{created=\"true\"} 1"));
        assert!(rendered.contains("solace_ticket_transitions_total{to=\"assigned\"} 1"));
    }

    #[test]
    fn recording_without_a_recorder_is_a_no_op() {
        record_message("assistant");
        record_classifier_latency(0.25);
    }
}
