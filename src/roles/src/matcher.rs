//! Accepted-value matching with compiled pattern caching
//!
//! In [`MatchMode::Literal`] an accepted value matches an actual value when
//! the two strings are equal. In [`MatchMode::Pattern`] the accepted value is
//! a regular expression searched anywhere in the actual value, so anchors
//! must be written into the pattern itself.
//!
//! Patterns may be written bare (`^cn=staff,`) or delimited with trailing
//! flags (`/^CN=staff,/i`). Any ASCII punctuation character other than `\`
//! opens a delimited pattern when the same character (or, for `(`, `[`, `{`
//! and `<`, the matching closing bracket) occurs again later with only
//! letters after its last occurrence. Anything else is a bare pattern.
//! Flags:
//!
//! | flag | effect                         |
//! |------|--------------------------------|
//! | `i`  | case-insensitive               |
//! | `m`  | `^` and `$` match at lines     |
//! | `s`  | `.` matches newline            |
//! | `x`  | ignore whitespace and comments |
//! | `U`  | swap greediness                |
//! | `A`  | anchor at the start            |
//! | `D`  | `$` matches only at the very end |
//! | `u`  | accepted, no effect            |
//!
//! Without `D` (or `m`), a trailing `$` also matches just before a final
//! newline. Only a `$` ending the pattern is rewritten this way; a `$` in the
//! middle of a pattern (`a$|b`) matches only at the very end.

use crate::config::MatchMode;
use crate::error::{Result, RoleError};
use dashmap::DashMap;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// Matcher for accepted values, caching compiled patterns
///
/// Cloning is cheap and clones share the cache. The cache only avoids
/// recompilation; it never changes a result.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    /// Compiled pattern cache keyed by the accepted value as configured
    pattern_cache: Arc<DashMap<String, Arc<Regex>>>,
}

impl Matcher {
    /// Create a matcher with an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `accepted` matches `actual` under `mode`
    ///
    /// # Errors
    ///
    /// Returns a pattern error in pattern mode when `accepted` does not
    /// compile.
    pub fn matches(&self, mode: MatchMode, accepted: &str, actual: &str) -> Result<bool> {
        match mode {
            MatchMode::Literal => Ok(accepted == actual),
            MatchMode::Pattern => Ok(self.compile(accepted)?.is_match(actual)),
        }
    }

    /// Whether `accepted` matches any of `actuals`, trying them in order
    ///
    /// Nothing is compiled when `actuals` is empty.
    pub fn matches_any(&self, mode: MatchMode, accepted: &str, actuals: &[String]) -> Result<bool> {
        if actuals.is_empty() {
            return Ok(false);
        }
        match mode {
            MatchMode::Literal => Ok(actuals.iter().any(|actual| actual == accepted)),
            MatchMode::Pattern => {
                let regex = self.compile(accepted)?;
                Ok(actuals.iter().any(|actual| regex.is_match(actual)))
            }
        }
    }

    /// Compile a pattern and cache the result
    pub fn compile(&self, pattern: &str) -> Result<Arc<Regex>> {
        if let Some(regex) = self.pattern_cache.get(pattern) {
            return Ok(regex.clone());
        }

        let regex = Arc::new(compile_pattern(pattern)?);
        self.pattern_cache.insert(pattern.to_string(), regex.clone());

        Ok(regex)
    }

    /// Number of compiled patterns held in the cache
    pub fn cached_patterns(&self) -> usize {
        self.pattern_cache.len()
    }

    /// Drop all compiled patterns
    pub fn clear_cache(&self) {
        self.pattern_cache.clear();
    }
}

/// Uncached [`Matcher::matches`]
pub fn matches(mode: MatchMode, accepted: &str, actual: &str) -> Result<bool> {
    match mode {
        MatchMode::Literal => Ok(accepted == actual),
        MatchMode::Pattern => Ok(compile_pattern(accepted)?.is_match(actual)),
    }
}

/// Compile an accepted value into a regular expression
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    let (body, flags) = split_delimited(pattern).unwrap_or((pattern, ""));

    let mut case_insensitive = false;
    let mut multi_line = false;
    let mut dot_matches_new_line = false;
    let mut ignore_whitespace = false;
    let mut swap_greed = false;
    let mut anchored = false;
    let mut dollar_end_only = false;

    for flag in flags.chars() {
        match flag {
            'i' => case_insensitive = true,
            'm' => multi_line = true,
            's' => dot_matches_new_line = true,
            'x' => ignore_whitespace = true,
            'U' => swap_greed = true,
            'A' => anchored = true,
            'D' => dollar_end_only = true,
            'u' => {}
            other => {
                return Err(RoleError::pattern(
                    pattern,
                    format!("unknown flag '{}'", other),
                ))
            }
        }
    }

    let body = if dollar_end_only || multi_line {
        body.to_string()
    } else {
        relax_trailing_dollar(body)
    };

    let expression = if anchored {
        format!(r"\A(?:{})", body)
    } else {
        body
    };

    RegexBuilder::new(&expression)
        .case_insensitive(case_insensitive)
        .multi_line(multi_line)
        .dot_matches_new_line(dot_matches_new_line)
        .ignore_whitespace(ignore_whitespace)
        .swap_greed(swap_greed)
        .build()
        .map_err(|e| RoleError::pattern(pattern, e.to_string()))
}

/// Split `/body/flags` into body and flags
///
/// Returns `None` for bare patterns: the first character is not a
/// delimiter, the closing delimiter is missing, or non-letters follow it.
fn split_delimited(pattern: &str) -> Option<(&str, &str)> {
    let opening = pattern.chars().next()?;
    if !opening.is_ascii_punctuation() || opening == '\\' {
        return None;
    }
    let closing = match opening {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        other => other,
    };

    let rest = &pattern[opening.len_utf8()..];
    let end = rest.rfind(closing)?;
    let flags = &rest[end + closing.len_utf8()..];
    if !flags.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    Some((&rest[..end], flags))
}

/// Let an unescaped trailing `$` also match before a final newline
fn relax_trailing_dollar(body: &str) -> String {
    match body.strip_suffix('$') {
        Some(head) => {
            let escapes = head.chars().rev().take_while(|&c| c == '\\').count();
            if escapes % 2 == 0 {
                format!(r"{}(?:\n?\z)", head)
            } else {
                body.to_string()
            }
        }
        None => body.to_string(),
    }
}
