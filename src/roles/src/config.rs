//! Evaluator and filter configuration
//!
//! [`EvaluatorConfig`] is the immutable per-evaluator setting pair (match mode
//! and role attribute name). [`FilterConfig`] is the record a host pipeline
//! hands over when it sets up the role filter, with the keys `roleRules`,
//! `regex` and `roleAttribute`.

use crate::error::{Result, RoleError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Default name of the attribute the evaluator writes into
pub const DEFAULT_ROLE_ATTRIBUTE: &str = "roles";

/// How accepted values are compared with actual attribute values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Exact string equality
    #[default]
    Literal,
    /// Accepted values are regular expressions searched in actual values
    Pattern,
}

impl MatchMode {
    /// Mode selected by the filter's `regex` flag
    pub fn from_regex_flag(regex: bool) -> Self {
        if regex {
            Self::Pattern
        } else {
            Self::Literal
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal => write!(f, "literal"),
            Self::Pattern => write!(f, "pattern"),
        }
    }
}

/// Evaluator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Comparison mode applied to every condition
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Attribute that receives granted role names
    #[serde(default = "default_role_attribute")]
    pub role_attribute: String,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::default(),
            role_attribute: default_role_attribute(),
        }
    }
}

impl EvaluatorConfig {
    /// Literal matching into `roles`
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the match mode
    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    /// Set the role attribute name
    pub fn with_role_attribute(mut self, role_attribute: impl Into<String>) -> Self {
        self.role_attribute = role_attribute.into();
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.role_attribute.is_empty() {
            return Err(RoleError::configuration("role attribute name cannot be empty"));
        }
        Ok(())
    }
}

/// Role filter configuration as supplied by the host pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Raw role rules, normalized by [`crate::rules::build_rule_set`]
    pub role_rules: Value,

    /// Enables pattern matching
    #[serde(default)]
    pub regex: bool,

    /// Attribute that receives granted role names
    #[serde(default = "default_role_attribute")]
    pub role_attribute: String,
}

impl FilterConfig {
    /// Read the configuration record from a JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(RoleError::configuration("filter configuration must be a map"));
        }
        let config: Self = serde_json::from_value(value)?;
        if !config.role_rules.is_object() {
            return Err(RoleError::configuration("roleRules must be a map of role to rules"));
        }
        Ok(config)
    }

    /// Evaluator settings carried by this record
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            match_mode: MatchMode::from_regex_flag(self.regex),
            role_attribute: self.role_attribute.clone(),
        }
    }
}

fn default_role_attribute() -> String {
    DEFAULT_ROLE_ATTRIBUTE.to_string()
}
