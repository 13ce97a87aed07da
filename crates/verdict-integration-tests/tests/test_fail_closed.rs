//! Fault-model tests: every internal failure mode must resolve to the
//! safest externally visible outcome — an inert rule, a BLOCK trigger, or a
//! degraded BLOCK result — and never a crash or an accidental ALLOW.

use serde_json::json;
use verdict_core::EvaluationFault;
use verdict_engine::{Action, EthicsEngine, Priority, Rule, RuleSet};

// ---------------------------------------------------------------------------
// Compile-time failures
// ---------------------------------------------------------------------------

#[test]
fn unparsable_rule_never_raises_never_triggers() {
    let broken_sources = [
        "",
        "(((",
        "equals(a, ",
        "unknown_predicate(a, b)",
        "not(is_present(a), is_present(b))",
        r#"equals(a, "unterminated"#,
        "42",
    ];
    for dsl in broken_sources {
        let rule = Rule::new("broken", "", dsl, Action::Block, Priority::Critical);
        assert!(rule.is_inert(), "expected inert for {dsl:?}");

        let set = RuleSet::new(vec![rule]);
        for plan in [json!({}), json!({"action": "anything"}), json!(null), json!([1, 2])] {
            let result = set.evaluate(&plan, &json!({}));
            assert_eq!(result.action, Action::Allow);
            assert!(result.triggered_rules.is_empty());
        }
    }
}

#[test]
fn broken_rule_does_not_poison_valid_neighbors() {
    let set = RuleSet::new(vec![
        Rule::new("broken", "", "((((", Action::Block, Priority::Critical),
        Rule::new(
            "valid_block",
            "",
            r#"equals(action, "bad")"#,
            Action::Block,
            Priority::High,
        ),
    ]);

    let result = set.evaluate(&json!({"action": "bad"}), &json!({}));
    assert_eq!(result.action, Action::Block);
    assert_eq!(result.triggered_rules.len(), 1);
    assert_eq!(result.triggered_rules[0].name, "valid_block");

    let result = set.evaluate(&json!({"action": "fine"}), &json!({}));
    assert_eq!(result.action, Action::Allow);
}

// ---------------------------------------------------------------------------
// Runtime predicate faults
// ---------------------------------------------------------------------------

#[test]
fn faulting_predicate_registers_block_trigger() {
    // The faulty rule is declared ALLOW — the fault must override that and
    // any simultaneously triggered WARN.
    let set = RuleSet::new(vec![
        Rule::new(
            "warn_everything",
            "",
            "is_present(action)",
            Action::Warn,
            Priority::High,
        ),
        Rule::new("faulty", "", "is_present(action)", Action::Allow, Priority::Low)
            .with_predicate(|_, _| {
                Err(EvaluationFault::Rule {
                    rule: "faulty".to_string(),
                    message: "injected fault".to_string(),
                })
            }),
    ]);

    let result = set.evaluate(&json!({"action": "x"}), &json!({}));
    assert_eq!(result.action, Action::Block);

    let faulty = result.triggered_rules.iter().find(|t| t.name == "faulty").unwrap();
    assert_eq!(faulty.action, Action::Block);
    assert_eq!(faulty.reason_code, "EVALUATION_ERROR");
    assert!(result
        .reasons
        .iter()
        .any(|r| r.contains("evaluation_error") && r.contains("faulty")));

    // The well-behaved rule is still recorded.
    assert!(result.triggered_rules.iter().any(|t| t.name == "warn_everything"));
}

#[test]
fn panicking_predicate_is_contained_as_block() {
    let set = RuleSet::new(vec![
        Rule::new("panicky", "", "is_present(action)", Action::Allow, Priority::Low)
            .with_predicate(|_, _| panic!("predicate bug")),
        Rule::new(
            "healthy",
            "",
            r#"equals(action, "x")"#,
            Action::Warn,
            Priority::Medium,
        ),
    ]);

    // Must not unwind out of evaluate.
    let result = set.evaluate(&json!({"action": "x"}), &json!({}));
    assert_eq!(result.action, Action::Block);
    assert!(result.triggered_rules.iter().any(|t| t.name == "panicky"));
    assert!(result.triggered_rules.iter().any(|t| t.name == "healthy"));
}

#[test]
fn fault_never_escapes_engine_surface() {
    let engine = EthicsEngine::new(RuleSet::new(vec![Rule::new(
        "panicky",
        "",
        "is_present(action)",
        Action::Allow,
        Priority::Low,
    )
    .with_predicate(|_, _| panic!("boom"))]));

    // Both public entry points stay total.
    let result = engine.evaluate_plan(&json!({"action": "x"}), &json!({}));
    assert_eq!(result.action, Action::Block);
    assert!(!engine.is_plan_allowed(&json!({"action": "x"}), &json!({})));

    // And the degraded outcomes are audited like any other.
    let stats = engine.get_stats();
    assert_eq!(stats.blocked, 2);
    assert_eq!(stats.audit_len, 2);
}

// ---------------------------------------------------------------------------
// Predicate-level fault folding: faults become false, not errors
// ---------------------------------------------------------------------------

#[test]
fn bad_regex_and_bad_quantities_fold_to_false() {
    let set = RuleSet::new(vec![
        Rule::new(
            "bad_regex",
            "",
            r#"matches(action, "([unclosed")"#,
            Action::Block,
            Priority::High,
        ),
        Rule::new(
            "bad_limit",
            "",
            r#"param_bytes_lte(params.size, "not-a-size")"#,
            Action::Block,
            Priority::High,
        ),
    ]);

    // Neither rule can ever match, but evaluation proceeds normally.
    let result = set.evaluate(&json!({"action": "x", "params": {"size": "5MB"}}), &json!({}));
    assert_eq!(result.action, Action::Allow);
    assert!(result.triggered_rules.is_empty());
}

#[test]
fn hostile_plan_shapes_never_crash() {
    let set = RuleSet::new(vec![
        Rule::new(
            "mixed",
            "",
            r#"and(greater_than(a.b.c, 10), or(contains(list, "x"), domain_is(url, "example.com")))"#,
            Action::Block,
            Priority::High,
        ),
        Rule::new(
            "tags",
            "",
            r#"high_risk_tag_combination(tags)"#,
            Action::Warn,
            Priority::Low,
        ),
    ]);

    let hostile_plans = [
        json!(null),
        json!("just a string"),
        json!([[[[]]]]),
        json!({"a": "not-an-object", "list": 42, "url": {"nested": true}, "tags": 3.14}),
        json!({"a": {"b": {"c": {"d": 1}}}}),
    ];
    for plan in hostile_plans {
        // Total evaluation: whatever the shape, a result comes back.
        let result = set.evaluate(&plan, &json!({}));
        assert!(matches!(result.action, Action::Allow | Action::Warn | Action::Block));
    }
}
