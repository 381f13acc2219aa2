//! Normalization of raw role rules into a [`RuleSet`]
//!
//! Accepted raw shapes per role:
//!
//! ```text
//! "admin": "superuser"                      one unnamed value
//! "admin": ["superuser", ["a", "b"]]        unnamed entries, one condition each
//! "admin": {"level": "5", "0": "root"}      named entries; integer keys are unnamed
//! ```
//!
//! Unnamed entries bind to the role attribute.

use super::types::{AttributeRef, Condition, RoleRule, RuleSet, RuleSetBuilder};
use crate::error::{Result, RoleError};
use serde_json::{Map, Value};
use tracing::warn;

/// Normalize raw role rules, keeping declaration order
///
/// # Errors
///
/// Returns a configuration error if `raw` is not a map of role name to rules,
/// or if a rule value has an unsupported shape.
pub fn build_rule_set(raw: &Value) -> Result<RuleSet> {
    let roles = raw
        .as_object()
        .ok_or_else(|| RoleError::configuration("role rules must be a map of role to rules"))?;

    let mut builder = RuleSetBuilder::new();
    for (role, rules) in roles {
        let conditions = normalize_rules(role, rules)?;
        builder.add_role(RoleRule::new(role.clone(), conditions))?;
    }
    Ok(builder.build())
}

fn normalize_rules(role: &str, rules: &Value) -> Result<Vec<Condition>> {
    match rules {
        Value::Object(entries) => normalize_entries(role, entries),
        Value::Array(items) => {
            let mut conditions = Vec::with_capacity(items.len());
            for item in items {
                push_condition(&mut conditions, role, AttributeRef::RoleAttribute, item)?;
            }
            Ok(conditions)
        }
        scalar => Ok(vec![Condition {
            attribute: AttributeRef::RoleAttribute,
            accepted_values: vec![scalar_value(role, scalar)?],
        }]),
    }
}

fn normalize_entries(role: &str, entries: &Map<String, Value>) -> Result<Vec<Condition>> {
    let mut conditions = Vec::with_capacity(entries.len());
    for (key, accepted) in entries {
        let attribute = if is_positional_key(key) {
            AttributeRef::RoleAttribute
        } else {
            AttributeRef::Named(key.clone())
        };
        push_condition(&mut conditions, role, attribute, accepted)?;
    }
    Ok(conditions)
}

fn push_condition(
    conditions: &mut Vec<Condition>,
    role: &str,
    attribute: AttributeRef,
    accepted: &Value,
) -> Result<()> {
    let accepted_values = match accepted {
        Value::Array(values) => values
            .iter()
            .map(|v| scalar_value(role, v))
            .collect::<Result<Vec<_>>>()?,
        scalar => vec![scalar_value(role, scalar)?],
    };

    // An empty list can never match; drop it so every condition has values
    if accepted_values.is_empty() {
        warn!(role, ?attribute, "Dropping condition with no accepted values");
        return Ok(());
    }

    conditions.push(Condition {
        attribute,
        accepted_values,
    });
    Ok(())
}

fn scalar_value(role: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(RoleError::configuration(format!(
            "role '{}' has an unsupported accepted value: {}",
            role, other
        ))),
    }
}

/// Keys like "0", "12" or "-1" are positional entries of a list serialized as a map
///
/// Only canonical decimal integers that fit an `i64` qualify; "012", "-0"
/// and "+1" stay attribute names.
fn is_positional_key(key: &str) -> bool {
    let digits = key.strip_prefix('-').unwrap_or(key);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !digits.starts_with('0'))
        && key.parse::<i64>().is_ok()
}
