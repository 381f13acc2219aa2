//! Integration tests for role derivation
//!
//! Exercises the public API end to end: filter configuration, rule
//! normalization, evaluation and error reporting.

use attribute_roles::{
    build_rule_set, evaluate, AttributeBag, EvaluatorConfig, MatchMode, RoleError, RoleFilter,
};
use serde_json::json;
use std::sync::Once;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn roles(bag: &AttributeBag) -> Vec<String> {
    bag.values("roles").to_vec()
}

/// University-style configuration mixing every rule shape
fn campus_filter(regex: bool) -> RoleFilter {
    RoleFilter::from_value(json!({
        "roleRules": {
            "student": {"eduPersonAffiliation": ["student"]},
            "employee": {"eduPersonAffiliation": ["staff", "faculty", "employee"]},
            "it-staff": {"memberOf": "cn=it,ou=groups,dc=example", "ou": "IT"},
            "admin": {"0": "it-staff", "level": ["9"]},
            "printing": ["student", "employee"],
            "vpn": "employee"
        },
        "regex": regex
    }))
    .unwrap()
}

#[test]
fn test_campus_employee() {
    init_tracing();
    let filter = campus_filter(false);

    let mut bag = AttributeBag::new()
        .with_attribute("eduPersonAffiliation", ["member", "staff"])
        .with_attribute("ou", ["IT"]);
    let granted = filter.process(&mut bag).unwrap();

    assert_eq!(granted, vec!["employee", "it-staff", "admin", "printing", "vpn"]);
    assert_eq!(roles(&bag), granted);
}

#[test]
fn test_campus_student() {
    init_tracing();
    let filter = campus_filter(false);

    let mut bag = AttributeBag::new().with_attribute("eduPersonAffiliation", ["student"]);
    filter.process(&mut bag).unwrap();

    assert_eq!(roles(&bag), vec!["student", "printing"]);
}

#[test]
fn test_campus_unknown_subject() {
    init_tracing();
    let filter = campus_filter(false);

    let mut bag = AttributeBag::new().with_attribute("uid", ["guest42"]);
    let granted = filter.process(&mut bag).unwrap();

    assert!(granted.is_empty());
    assert_eq!(bag.get("roles"), Some(&[][..]));
    assert_eq!(bag.values("uid"), ["guest42".to_string()]);
}

#[test]
fn test_campus_pattern_mode() {
    init_tracing();
    let filter = RoleFilter::from_value(json!({
        "roleRules": {
            "staff": {"memberOf": ["/^cn=(staff|faculty),/i"]},
            "eng": {"ou": "~^eng~"},
            "eng-staff": ["^staff$", "^eng$"]
        },
        "regex": true
    }))
    .unwrap();

    let mut bag = AttributeBag::new()
        .with_attribute("memberOf", ["CN=Faculty,ou=groups,dc=example"])
        .with_attribute("ou", ["sales"]);
    filter.process(&mut bag).unwrap();

    // eng-staff needs either staff or eng; staff suffices
    assert_eq!(roles(&bag), vec!["staff", "eng-staff"]);
}

#[test]
fn test_order_sensitivity() {
    init_tracing();
    let bag = AttributeBag::new().with_attribute("dept", ["eng"]);

    let dependent_first = build_rule_set(&json!({
        "A": {"roles": ["B"]},
        "B": {"dept": ["eng"]}
    }))
    .unwrap();
    let result = evaluate(&dependent_first, bag.clone(), &EvaluatorConfig::default()).unwrap();
    assert_eq!(roles(&result), vec!["B"]);

    let prerequisite_first = build_rule_set(&json!({
        "B": {"dept": ["eng"]},
        "A": {"roles": ["B"]}
    }))
    .unwrap();
    let result = evaluate(&prerequisite_first, bag, &EvaluatorConfig::default()).unwrap();
    assert_eq!(roles(&result), vec!["B", "A"]);
}

#[test]
fn test_forward_references_reported() {
    let rules = build_rule_set(&json!({
        "A": {"roles": ["B"]},
        "B": {"dept": ["eng"]}
    }))
    .unwrap();

    let refs = rules.forward_references("roles");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].role, "A");
    assert_eq!(refs[0].referenced, "B");
}

#[test]
fn test_rules_from_serialized_mixed_array() {
    // array('staff', 'title' => 'dean') arrives as {"0": "staff", "title": "dean"}
    let rules = build_rule_set(&json!({
        "staff": {"affiliation": "staff"},
        "board": {"0": "staff", "title": "dean"}
    }))
    .unwrap();

    let bag = AttributeBag::new().with_attribute("affiliation", ["staff"]);
    let bag = evaluate(&rules, bag, &EvaluatorConfig::default()).unwrap();
    assert_eq!(roles(&bag), vec!["staff", "board"]);

    let bag = AttributeBag::new().with_attribute("title", ["dean"]);
    let bag = evaluate(&rules, bag, &EvaluatorConfig::default()).unwrap();
    assert_eq!(roles(&bag), vec!["board"]);
}

#[test]
fn test_configuration_errors() {
    assert!(matches!(
        RoleFilter::from_value(json!({"roleRules": "admin"})),
        Err(RoleError::Configuration(_))
    ));
    assert!(matches!(
        RoleFilter::from_value(json!({"regex": true})),
        Err(RoleError::Configuration(_))
    ));
    assert!(matches!(
        build_rule_set(&json!([{"admin": "root"}])),
        Err(RoleError::Configuration(_))
    ));
    assert!(matches!(
        AttributeBag::from_json(&json!("uid=alice")),
        Err(RoleError::Configuration(_))
    ));
}

#[test]
fn test_pattern_error_aborts_request() {
    init_tracing();
    let filter = RoleFilter::from_value(json!({
        "roleRules": {"broken": {"dept": "/eng/z"}},
        "regex": true
    }))
    .unwrap();

    let err = filter
        .process_value(&json!({"dept": "engineering"}))
        .unwrap_err();
    assert!(err.is_pattern());
    assert!(err.to_string().contains("/eng/z"));
}

#[test]
fn test_same_rules_different_configs() {
    let rules = build_rule_set(&json!({"r": {"v": "a.c"}})).unwrap();
    let bag = AttributeBag::new().with_attribute("v", ["abc"]);

    let literal = evaluate(&rules, bag.clone(), &EvaluatorConfig::default()).unwrap();
    let pattern = evaluate(
        &rules,
        bag,
        &EvaluatorConfig::new()
            .with_match_mode(MatchMode::Pattern)
            .with_role_attribute("granted"),
    )
    .unwrap();

    assert!(roles(&literal).is_empty());
    assert_eq!(pattern.values("granted"), ["r".to_string()]);
}
