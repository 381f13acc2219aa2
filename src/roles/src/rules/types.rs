//! Rule model type definitions

use crate::error::{Result, RoleError};
use crate::types::RoleName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Attribute a condition inspects
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeRef {
    /// The configured role attribute, used to require an earlier-granted role
    RoleAttribute,
    /// An explicitly named attribute
    Named(String),
}

impl AttributeRef {
    /// Attribute name under the given role attribute name
    pub fn resolve<'a>(&'a self, role_attribute: &'a str) -> &'a str {
        match self {
            Self::RoleAttribute => role_attribute,
            Self::Named(name) => name,
        }
    }

    /// Whether this reference reads the role attribute
    pub fn is_role_attribute(&self, role_attribute: &str) -> bool {
        match self {
            Self::RoleAttribute => true,
            Self::Named(name) => name == role_attribute,
        }
    }
}

/// One (attribute, accepted values) test within a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Attribute whose values are tested
    pub attribute: AttributeRef,

    /// Values accepted, tried in order
    pub accepted_values: Vec<String>,
}

impl Condition {
    /// Condition on an explicitly named attribute
    pub fn named<I, S>(attribute: impl Into<String>, accepted_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attribute: AttributeRef::Named(attribute.into()),
            accepted_values: accepted_values.into_iter().map(Into::into).collect(),
        }
    }

    /// Condition requiring one of the given roles to be granted already
    pub fn has_role<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attribute: AttributeRef::RoleAttribute,
            accepted_values: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Validate the condition shape
    pub fn validate(&self) -> Result<()> {
        if let AttributeRef::Named(name) = &self.attribute {
            if name.is_empty() {
                return Err(RoleError::configuration("condition attribute name cannot be empty"));
            }
        }
        if self.accepted_values.is_empty() {
            return Err(RoleError::configuration(format!(
                "condition on {:?} has no accepted values",
                self.attribute
            )));
        }
        Ok(())
    }
}

/// A role and the conditions that grant it (any one suffices)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    /// Role name, written into the role attribute when granted
    pub name: RoleName,

    /// Conditions, evaluated in order
    pub conditions: Vec<Condition>,
}

impl RoleRule {
    /// Create a role rule
    pub fn new(name: impl Into<RoleName>, conditions: Vec<Condition>) -> Self {
        Self {
            name: name.into(),
            conditions,
        }
    }

    /// Validate the role rule
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(RoleError::configuration("role name cannot be empty"));
        }
        for condition in &self.conditions {
            condition.validate().map_err(|e| match e {
                RoleError::Configuration(msg) => {
                    RoleError::configuration(format!("role '{}': {}", self.name, msg))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

/// Ordered, immutable set of role rules
///
/// Roles are evaluated in declaration order. A role that depends on another
/// role through the role attribute only sees roles declared before it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    roles: Vec<RoleRule>,
}

impl RuleSet {
    /// Start building a rule set
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    /// Roles in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &RoleRule> {
        self.roles.iter()
    }

    /// Look up a role by name
    pub fn get(&self, name: &str) -> Option<&RoleRule> {
        self.roles.iter().find(|r| r.name == name)
    }

    /// Position of a role in declaration order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.roles.iter().position(|r| r.name == name)
    }

    /// Role names in declaration order
    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.name.as_str()).collect()
    }

    /// Number of roles
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether the rule set has no roles
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RoleRule;
    type IntoIter = std::slice::Iter<'a, RoleRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.roles.iter()
    }
}

/// Builder for [`RuleSet`], rejecting invalid and duplicate roles
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    roles: Vec<RoleRule>,
    names: HashSet<RoleName>,
}

impl RuleSetBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a role after the roles already added
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the role is invalid or its name was
    /// already added.
    pub fn add_role(&mut self, role: RoleRule) -> Result<&mut Self> {
        role.validate()?;

        if !self.names.insert(role.name.clone()) {
            return Err(RoleError::configuration(format!(
                "duplicate role: {}",
                role.name
            )));
        }

        self.roles.push(role);
        Ok(self)
    }

    /// Append a role given its name and conditions
    pub fn role(mut self, name: impl Into<RoleName>, conditions: Vec<Condition>) -> Result<Self> {
        self.add_role(RoleRule::new(name, conditions))?;
        Ok(self)
    }

    /// Finish the rule set
    pub fn build(self) -> RuleSet {
        RuleSet { roles: self.roles }
    }
}
