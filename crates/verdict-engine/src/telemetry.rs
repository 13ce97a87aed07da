//! # Telemetry Emission
//!
//! Emits evaluation metrics through the `metrics` facade. The exporter is a
//! deployment concern: with no recorder installed these calls are no-ops,
//! and installing one (Prometheus, statsd, ...) requires no change here.

use crate::ruleset::EvaluationResult;

/// Record one evaluation: a counter by decision, a hit counter per
/// triggered rule, the duration histogram, and a gauge labeled with the
/// active ruleset hash.
pub(crate) fn record_evaluation(result: &EvaluationResult) {
    metrics::counter!(
        "verdict_evaluations_total",
        "action" => result.action.as_str()
    )
    .increment(1);

    for triggered in &result.triggered_rules {
        metrics::counter!(
            "verdict_rule_hits_total",
            "rule" => triggered.name.clone(),
            "action" => triggered.action.as_str()
        )
        .increment(1);
    }

    metrics::histogram!("verdict_evaluation_duration_seconds")
        .record(result.duration.as_secs_f64());

    metrics::gauge!(
        "verdict_active_ruleset",
        "ruleset_hash" => result.ruleset_hash.clone()
    )
    .set(1.0);
}
