//! Single-pass role evaluation
//!
//! The evaluator walks the rule set once, in declaration order, and grants a
//! role on the first condition that matches. Roles are written into the role
//! attribute as they are granted, so a later role can require an earlier one.
//! There is no iteration to a fixed point: a role that depends on a role
//! declared after it only matches when the bag already carried that role.
//!
//! ```text
//! for role in rule set:
//!     skip if role already in bag[role attribute]
//!     for condition in role:                 any one condition suffices
//!         skip if bag has no such attribute
//!         for accepted in condition:
//!             if accepted matches any actual value: grant, next role
//! ```

use crate::config::EvaluatorConfig;
use crate::error::Result;
use crate::matcher::Matcher;
use crate::rules::{RoleRule, RuleSet};
use crate::types::{AttributeBag, RoleName};

use std::sync::Arc;
use tracing::{debug, trace};


/// Evaluates a rule set against attribute bags
///
/// The evaluator holds no per-request state and can be shared across threads;
/// each call mutates only the bag it is given.
#[derive(Debug, Clone)]
pub struct Evaluator {
    /// Rules, read-only for the evaluator's lifetime
    rule_set: Arc<RuleSet>,

    /// Match mode and role attribute
    config: EvaluatorConfig,

    /// Accepted-value matcher
    matcher: Matcher,
}

impl Evaluator {
    /// Create an evaluator
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the role attribute name is empty.
    pub fn new(rule_set: impl Into<Arc<RuleSet>>, config: EvaluatorConfig) -> Result<Self> {
        Self::with_matcher(rule_set, config, Matcher::new())
    }

    /// Create an evaluator sharing an existing matcher and its pattern cache
    pub fn with_matcher(
        rule_set: impl Into<Arc<RuleSet>>,
        config: EvaluatorConfig,
        matcher: Matcher,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            rule_set: rule_set.into(),
            config,
            matcher,
        })
    }

    /// Add granted roles to `bag`, returning the roles granted by this call
    ///
    /// The role attribute is created empty if absent. Roles already present
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns a pattern error if a pattern that has to be evaluated does not
    /// compile. Roles granted before the error stay in `bag`.
    pub fn evaluate(&self, bag: &mut AttributeBag) -> Result<Vec<RoleName>> {
        run_pass(&self.rule_set, &self.config, &self.matcher, bag)
    }

    /// Rules being evaluated
    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    /// Evaluator configuration
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Matcher, for inspecting the pattern cache
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }
}

/// Evaluate `rule_set` against `bag` and return the updated bag
///
/// Convenience for one-off calls: the rule set is borrowed, but patterns are
/// compiled afresh every time. Per-request evaluation should go through an
/// [`Evaluator`] or [`RoleFilter`](crate::RoleFilter), which keep the compiled
/// pattern cache.
///
/// # Errors
///
/// Returns a configuration error if the role attribute name is empty, or a
/// pattern error as [`Evaluator::evaluate`] does.
pub fn evaluate(
    rule_set: &RuleSet,
    mut bag: AttributeBag,
    config: &EvaluatorConfig,
) -> Result<AttributeBag> {
    config.validate()?;
    run_pass(rule_set, config, &Matcher::new(), &mut bag)?;
    Ok(bag)
}

/// One pass over `rule_set`, granting roles into `bag`
fn run_pass(
    rule_set: &RuleSet,
    config: &EvaluatorConfig,
    matcher: &Matcher,
    bag: &mut AttributeBag,
) -> Result<Vec<RoleName>> {
    let role_attribute = config.role_attribute.as_str();
    bag.ensure(role_attribute);

    let mut granted = Vec::new();

    for rule in rule_set.iter() {
        if bag.contains_value(role_attribute, &rule.name) {
            debug!(role = %rule.name, "Role already assigned, skipping");
            continue;
        }

        if let Some(condition) = first_match(rule, config, matcher, bag)? {
            debug!(role = %rule.name, condition, "Role granted");
            bag.push(role_attribute, rule.name.clone());
            granted.push(rule.name.clone());
        }
    }

    Ok(granted)
}

/// Index of the first matching condition of `rule`
fn first_match(
    rule: &RoleRule,
    config: &EvaluatorConfig,
    matcher: &Matcher,
    bag: &AttributeBag,
) -> Result<Option<usize>> {
    let role_attribute = config.role_attribute.as_str();

    for (idx, condition) in rule.conditions.iter().enumerate() {
        let attribute = condition.attribute.resolve(role_attribute);
        let actuals = match bag.get(attribute) {
            Some(values) => values,
            None => {
                trace!(role = %rule.name, attribute, "Attribute absent, condition skipped");
                continue;
            }
        };

        for accepted in &condition.accepted_values {
            if matcher.matches_any(config.match_mode, accepted, actuals)? {
                return Ok(Some(idx));
            }
        }
    }

    Ok(None)
}
