//! Role-on-role reference analysis
//!
//! Evaluation is a single pass in declaration order, so a role can only
//! depend on roles declared before it. This module finds references that
//! break that rule. It is a diagnostic: evaluation never consults it.

use super::types::RuleSet;
use serde::Serialize;

/// A role-attribute condition naming a role that is not declared earlier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardReference {
    /// Role holding the condition
    pub role: String,

    /// Role named by the condition
    pub referenced: String,

    /// Index of the condition within the role
    pub condition_index: usize,
}

impl RuleSet {
    /// Role-attribute conditions that name a role declared at or after
    /// the referencing role
    ///
    /// Accepted values are compared literally, so the result is only
    /// meaningful for literal matching. Such a condition matches only when
    /// the bag already carried the referenced role before evaluation.
    pub fn forward_references(&self, role_attribute: &str) -> Vec<ForwardReference> {
        let mut found = Vec::new();

        for (idx, rule) in self.iter().enumerate() {
            for (condition_index, condition) in rule.conditions.iter().enumerate() {
                if !condition.attribute.is_role_attribute(role_attribute) {
                    continue;
                }
                for value in &condition.accepted_values {
                    match self.position(value) {
                        Some(pos) if pos >= idx => found.push(ForwardReference {
                            role: rule.name.clone(),
                            referenced: value.clone(),
                            condition_index,
                        }),
                        _ => {}
                    }
                }
            }
        }

        found
    }

    /// Roles whose conditions read the role attribute
    pub fn composed_roles(&self, role_attribute: &str) -> Vec<&str> {
        self.iter()
            .filter(|rule| {
                rule.conditions
                    .iter()
                    .any(|c| c.attribute.is_role_attribute(role_attribute))
            })
            .map(|rule| rule.name.as_str())
            .collect()
    }
}
