//! Core attribute types

use crate::error::{Result, RoleError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Role identifier, also the value written into the role attribute
pub type RoleName = String;

/// Attribute name
pub type AttributeName = String;

/// Named, multi-valued facts known about a subject
///
/// A missing key is distinct from a key with no values: conditions on a
/// missing attribute are skipped, while an empty attribute simply has
/// nothing to match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeBag {
    attributes: HashMap<AttributeName, Vec<String>>,
}

impl AttributeBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag from a JSON object of string or string-array values
    ///
    /// Numbers are accepted and stored as their decimal text.
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| RoleError::configuration("attribute bag must be a map"))?;

        let mut bag = Self::new();
        for (name, raw) in map {
            let values = match raw {
                Value::Array(items) => items
                    .iter()
                    .map(|item| attribute_value(name, item))
                    .collect::<Result<Vec<_>>>()?,
                other => vec![attribute_value(name, other)?],
            };
            bag.attributes.insert(name.clone(), values);
        }
        Ok(bag)
    }

    /// Add an attribute with its values, replacing any previous values
    pub fn with_attribute<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(name, values);
        self
    }

    /// Set the values of an attribute, replacing any previous values
    pub fn insert<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .insert(name.into(), values.into_iter().map(Into::into).collect());
    }

    /// Values of an attribute, `None` when the attribute is absent
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    /// Values of an attribute, empty when the attribute is absent
    pub fn values(&self, name: &str) -> &[String] {
        self.get(name).unwrap_or(&[])
    }

    /// Whether the attribute is present (possibly with no values)
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Whether the attribute is present and carries `value`
    pub fn contains_value(&self, name: &str, value: &str) -> bool {
        self.values(name).iter().any(|v| v == value)
    }

    /// Remove an attribute, returning its values
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.attributes.remove(name)
    }

    /// Iterate over attribute names and values
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.attributes
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the bag holds no attributes
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Create the attribute with no values if it is absent
    pub(crate) fn ensure(&mut self, name: &str) {
        if !self.attributes.contains_key(name) {
            self.attributes.insert(name.to_string(), Vec::new());
        }
    }

    /// Append one value to an attribute, creating it when absent
    pub(crate) fn push(&mut self, name: &str, value: impl Into<String>) {
        self.attributes
            .entry(name.to_string())
            .or_default()
            .push(value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeBag
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut bag = Self::new();
        for (name, values) in iter {
            bag.insert(name, values);
        }
        bag
    }
}

fn attribute_value(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(RoleError::configuration(format!(
            "attribute '{}' has a non-string value: {}",
            name, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bag_creation() {
        let bag = AttributeBag::new()
            .with_attribute("dept", ["eng"])
            .with_attribute("memberOf", ["cn=staff", "cn=admins"]);

        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get("dept"), Some(&["eng".to_string()][..]));
        assert!(bag.contains_value("memberOf", "cn=admins"));
        assert!(!bag.contains_value("memberOf", "cn=guests"));
        assert_eq!(bag.get("missing"), None);
        assert!(bag.values("missing").is_empty());
    }

    #[test]
    fn test_missing_is_distinct_from_empty() {
        let mut bag = AttributeBag::new();
        assert!(!bag.contains("roles"));

        bag.ensure("roles");
        assert!(bag.contains("roles"));
        assert_eq!(bag.get("roles"), Some(&[][..]));

        bag.push("roles", "staff");
        bag.ensure("roles");
        assert_eq!(bag.values("roles"), ["staff".to_string()]);
    }

    #[test]
    fn test_from_json() {
        let bag = AttributeBag::from_json(&json!({
            "uid": "alice",
            "level": 5,
            "memberOf": ["cn=staff", "cn=admins"],
            "roles": []
        }))
        .unwrap();

        assert_eq!(bag.values("uid"), ["alice".to_string()]);
        assert_eq!(bag.values("level"), ["5".to_string()]);
        assert_eq!(bag.values("memberOf").len(), 2);
        assert!(bag.contains("roles"));
    }

    #[test]
    fn test_from_json_rejects_non_map() {
        let err = AttributeBag::from_json(&json!(["alice"])).unwrap_err();
        assert!(err.is_configuration());

        let err = AttributeBag::from_json(&json!({"uid": {"nested": true}})).unwrap_err();
        assert!(err.is_configuration());

        let err = AttributeBag::from_json(&json!({"uid": [null]})).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_serde_is_plain_map() {
        let bag = AttributeBag::new().with_attribute("dept", ["eng"]);
        let json = serde_json::to_value(&bag).unwrap();
        assert_eq!(json, json!({"dept": ["eng"]}));

        let back: AttributeBag = serde_json::from_value(json).unwrap();
        assert_eq!(back, bag);
    }
}
