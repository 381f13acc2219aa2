//! Role filter: the assembled processing step a host pipeline runs per request

use crate::config::{EvaluatorConfig, FilterConfig, MatchMode};
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::rules::{build_rule_set, RuleSet};
use crate::types::{AttributeBag, RoleName};

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Role filter built once from configuration and applied to each request
#[derive(Debug, Clone)]
pub struct RoleFilter {
    evaluator: Evaluator,
}

impl RoleFilter {
    /// Build the filter from a configuration record
    ///
    /// Forward role references are reported at `warn` level in literal mode.
    pub fn from_config(config: FilterConfig) -> Result<Self> {
        let rule_set = build_rule_set(&config.role_rules)?;
        Self::new(rule_set, config.evaluator_config())
    }

    /// Build the filter from the raw JSON configuration record
    pub fn from_value(value: Value) -> Result<Self> {
        Self::from_config(FilterConfig::from_value(value)?)
    }

    /// Build the filter from an already normalized rule set
    pub fn new(rule_set: impl Into<Arc<RuleSet>>, config: EvaluatorConfig) -> Result<Self> {
        let evaluator = Evaluator::new(rule_set, config)?;
        let rule_set = evaluator.rule_set();
        let config = evaluator.config();

        if config.match_mode == MatchMode::Literal {
            for reference in rule_set.forward_references(&config.role_attribute) {
                warn!(
                    role = %reference.role,
                    referenced = %reference.referenced,
                    "Role depends on a role that is not declared before it; \
                     it only matches when the bag already carries that role"
                );
            }
        }

        info!(
            "RoleFilter initialized with roles={}, match_mode={}, role_attribute={}",
            rule_set.len(),
            config.match_mode,
            config.role_attribute
        );

        Ok(Self { evaluator })
    }

    /// Run one evaluation pass over the request's attributes
    ///
    /// Returns the roles granted by this pass.
    pub fn process(&self, attributes: &mut AttributeBag) -> Result<Vec<RoleName>> {
        self.evaluator.evaluate(attributes)
    }

    /// Evaluate a JSON attribute map, returning the updated bag
    pub fn process_value(&self, attributes: &Value) -> Result<AttributeBag> {
        let mut bag = AttributeBag::from_json(attributes)?;
        self.process(&mut bag)?;
        Ok(bag)
    }

    /// Underlying evaluator
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}
