//! Rule model
//!
//! Represents configured role rules as an ordered [`RuleSet`] of
//! [`RoleRule`]s, each a list of [`Condition`]s. No matching happens here;
//! this module only shapes and validates data.
//!
//! # Example
//!
//! ```rust
//! use attribute_roles::rules::{build_rule_set, AttributeRef};
//! use serde_json::json;
//!
//! let rules = build_rule_set(&json!({
//!     "employee": {"dept": ["eng", "ops"]},
//!     "manager": ["employee"],
//! }))?;
//!
//! let manager = rules.get("manager").unwrap();
//! assert_eq!(manager.conditions[0].attribute, AttributeRef::RoleAttribute);
//! # Ok::<(), attribute_roles::RoleError>(())
//! ```

pub mod graph;
pub mod normalize;
pub mod types;


pub use graph::ForwardReference;
pub use normalize::build_rule_set;
pub use types::{AttributeRef, Condition, RoleRule, RuleSet, RuleSetBuilder};
