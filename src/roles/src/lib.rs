//! # Attribute Roles
//!
//! Derives a multi-valued roles attribute from an identity's attribute bag by
//! evaluating declarative role rules.
//!
//! ## Features
//!
//! - **Rule normalization** from the scalar / list / map rule shapes
//! - **Literal or pattern matching**, fixed per evaluator
//! - **Role composition**: a role may require a role granted earlier in the
//!   same pass
//! - **Compiled pattern caching** shared across evaluations
//!
//! ## Example
//!
//! ```rust
//! use attribute_roles::{build_rule_set, evaluate, AttributeBag, EvaluatorConfig, MatchMode};
//! use serde_json::json;
//!
//! let rules = build_rule_set(&json!({
//!     "staff": {"memberOf": "^cn=staff,"},
//!     "library": ["staff"],
//! }))?;
//!
//! let bag = AttributeBag::new().with_attribute("memberOf", ["cn=staff,ou=groups,dc=example"]);
//! let config = EvaluatorConfig::new().with_match_mode(MatchMode::Pattern);
//!
//! let bag = evaluate(&rules, bag, &config)?;
//! assert_eq!(bag.values("roles"), ["staff".to_string(), "library".to_string()]);
//! # Ok::<(), attribute_roles::RoleError>(())
//! ```

pub mod config;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod matcher;
pub mod rules;
pub mod types;

// Re-export commonly used types
pub use config::{EvaluatorConfig, FilterConfig, MatchMode, DEFAULT_ROLE_ATTRIBUTE};
pub use error::{Result, RoleError};
pub use evaluator::{evaluate, Evaluator};
pub use filter::RoleFilter;
pub use matcher::Matcher;
pub use rules::{build_rule_set, AttributeRef, Condition, RoleRule, RuleSet, RuleSetBuilder};
pub use types::{AttributeBag, AttributeName, RoleName};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
