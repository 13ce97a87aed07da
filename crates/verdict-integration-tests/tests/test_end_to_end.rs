//! End-to-end evaluation flows through the public surface: ruleset
//! construction, the decision lattice, engine delegation, audit capture,
//! and stats.

use serde_json::json;
use verdict_engine::{Action, EthicsEngine, Priority, Rule, RuleSet};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn standard_ruleset() -> RuleSet {
    RuleSet::new(vec![
        Rule::new(
            "no_user_data_deletion",
            "Blocks user data deletion",
            r#"equals(action, "delete_user_data")"#,
            Action::Block,
            Priority::Critical,
        ),
        Rule::new(
            "warn_external_call",
            "Flags calls to external services",
            r#"equals(action, "external_call")"#,
            Action::Warn,
            Priority::Medium,
        ),
    ])
}

// ---------------------------------------------------------------------------
// Lattice outcomes
// ---------------------------------------------------------------------------

#[test]
fn critical_block_rule_blocks() {
    let set = standard_ruleset();
    let result = set.evaluate(&json!({"action": "delete_user_data"}), &json!({}));
    assert_eq!(result.action, Action::Block);
    assert_eq!(result.triggered_rules.len(), 1);
    assert_eq!(result.triggered_rules[0].name, "no_user_data_deletion");
}

#[test]
fn medium_warn_rule_warns() {
    let set = standard_ruleset();
    let result = set.evaluate(&json!({"action": "external_call"}), &json!({}));
    assert_eq!(result.action, Action::Warn);
    assert_eq!(result.triggered_rules.len(), 1);
    assert_eq!(result.triggered_rules[0].name, "warn_external_call");
}

#[test]
fn untouched_plan_allows_with_default_reason() {
    let set = standard_ruleset();
    let result = set.evaluate(&json!({"action": "noop"}), &json!({}));
    assert_eq!(result.action, Action::Allow);
    assert!(result.triggered_rules.is_empty());
    assert_eq!(result.reasons, vec!["allow: no_rules_triggered"]);
}

#[test]
fn block_wins_over_simultaneous_warn_and_allow() {
    let set = RuleSet::new(vec![
        Rule::new(
            "allow_reads",
            "",
            r#"contains(action, "read")"#,
            Action::Allow,
            Priority::Low,
        ),
        Rule::new(
            "warn_bulk",
            "",
            r#"is_present(params.bulk)"#,
            Action::Warn,
            Priority::Medium,
        ),
        Rule::new(
            "block_exports",
            "",
            r#"contains(action, "export")"#,
            Action::Block,
            Priority::Critical,
        ),
    ]);
    let plan = json!({"action": "read_and_export", "params": {"bulk": true}});
    let result = set.evaluate(&plan, &json!({}));
    assert_eq!(result.action, Action::Block);
    // Every matching rule is still recorded.
    assert_eq!(result.triggered_rules.len(), 3);
}

// ---------------------------------------------------------------------------
// Predicates through the whole stack
// ---------------------------------------------------------------------------

#[test]
fn context_rooted_paths_and_consent() {
    let set = RuleSet::new(vec![Rule::new(
        "block_without_consent",
        "PII processing requires recorded consent",
        r#"and(has_category(tags, "pii"), lacks_consent(context.consent.granted))"#,
        Action::Block,
        Priority::High,
    )]);

    let plan = json!({"action": "process", "tags": ["email", "ssn"]});
    let blocked = set.evaluate(&plan, &json!({}));
    assert_eq!(blocked.action, Action::Block);

    let allowed = set.evaluate(&plan, &json!({"consent": {"granted": true}}));
    assert_eq!(allowed.action, Action::Allow);
}

#[test]
fn domain_and_size_predicates_compose() {
    let set = RuleSet::new(vec![Rule::new(
        "block_large_external_upload",
        "",
        r#"and(domain_etld1(params.url, "example.com"), not(param_bytes_lte(params.size, "10MB")))"#,
        Action::Block,
        Priority::High,
    )]);

    let big = json!({"params": {"url": "https://upload.example.com/x", "size": "20MB"}});
    assert_eq!(set.evaluate(&big, &json!({})).action, Action::Block);

    let small = json!({"params": {"url": "https://upload.example.com/x", "size": "5MB"}});
    assert_eq!(set.evaluate(&small, &json!({})).action, Action::Allow);

    let elsewhere = json!({"params": {"url": "https://upload.other.org/x", "size": "20MB"}});
    assert_eq!(set.evaluate(&elsewhere, &json!({})).action, Action::Allow);
}

// ---------------------------------------------------------------------------
// Engine surface
// ---------------------------------------------------------------------------

#[test]
fn engine_full_cycle_with_stats_and_audit() {
    let engine = EthicsEngine::new(standard_ruleset());

    assert!(!engine.is_plan_allowed(&json!({"action": "delete_user_data"}), &json!({})));
    assert!(engine.is_plan_allowed(&json!({"action": "external_call"}), &json!({})));
    assert!(engine.is_plan_allowed(&json!({"action": "noop"}), &json!({})));

    let stats = engine.get_stats();
    assert_eq!(stats.total_evaluations, 3);
    assert_eq!(stats.blocked, 1);
    assert_eq!(stats.warned, 1);
    assert_eq!(stats.allowed, 1);
    assert_eq!(stats.audit_len, 3);
    assert_eq!(stats.rule_count, 2);

    // Audit records carry hashes and codes, in evaluation order.
    assert_eq!(stats.recent.len(), 3);
    assert_eq!(stats.recent[0].action, Action::Block);
    assert_eq!(stats.recent[0].reason_codes, vec!["NO_USER_DATA_DELETION"]);
    assert_eq!(stats.recent[0].ruleset_hash, stats.ruleset_hash);
    assert!(!stats.recent[0].plan_hash.is_empty());
}

#[test]
fn engine_reload_changes_decisions() {
    let engine = EthicsEngine::new(standard_ruleset());
    assert!(engine.is_plan_allowed(&json!({"action": "migrate"}), &json!({})));

    engine.reload(RuleSet::new(vec![Rule::new(
        "block_migrations",
        "",
        r#"equals(action, "migrate")"#,
        Action::Block,
        Priority::Critical,
    )]));

    assert!(!engine.is_plan_allowed(&json!({"action": "migrate"}), &json!({})));
}
