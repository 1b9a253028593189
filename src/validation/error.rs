//! Validation failures.
//!
//! [`FieldError`] is the value object handed to error responses.
//! [`RuleViolation`] is what a check raises when a value breaks a rule;
//! [`ValidatorError`] additionally carries configuration bugs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::validation::format::{is_truthy, render, vsprintf};
use crate::validation::rule::Rule;

const MAX_VALUE_PREVIEW: usize = 60;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    field: String,
    message: String,
    code: i64,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: i64) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    /// Plain mapping form: `{field, message, code}`.
    pub fn to_map(&self) -> Map<String, Value> {
        self.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

impl<'a> IntoIterator for &'a FieldError {
    type Item = (&'static str, Value);
    type IntoIter = std::array::IntoIter<(&'static str, Value), 3>;

    fn into_iter(self) -> Self::IntoIter {
        [
            ("field", Value::String(self.field.clone())),
            ("message", Value::String(self.message.clone())),
            ("code", Value::from(self.code)),
        ]
        .into_iter()
    }
}

/// Raised when a value breaks a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuleViolation {
    field: String,
    message: String,
    code: i64,
}

impl RuleViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: i64) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }

    /// Build a violation from a rule, formatting its message with the rule
    /// argument. When `value` is given (and filled), the message is prefixed
    /// with a quoted preview of it.
    pub fn from_rule(rule: &Rule, value: Option<&Value>) -> Self {
        let mut message = String::new();
        if let Some(value) = value.filter(|v| is_truthy(v)) {
            message.push('\'');
            message.push_str(&truncate(&render(value), MAX_VALUE_PREVIEW));
            message.push_str("' is invalid value: ");
        }
        message.push_str(&vsprintf(rule.message(), rule.argument()));

        Self::new(rule.field(), message, rule.code())
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }
}

impl From<RuleViolation> for FieldError {
    fn from(violation: RuleViolation) -> Self {
        FieldError::new(violation.field, violation.message, violation.code)
    }
}

/// Errors produced while checking a value against a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorError {
    /// The value breaks the rule. User error.
    #[error(transparent)]
    Violation(#[from] RuleViolation),

    /// The validator is misconfigured (missing handler, unknown type).
    #[error("{0}")]
    InvalidState(String),

    /// The rule itself is malformed (e.g. a regexp rule without a pattern).
    #[error("{0}")]
    InvalidArgument(String),
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('\u{2026}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_error_conversion() {
        let error = FieldError::new("email", "Invalid email", 4001);
        let map = error.to_map();
        assert_eq!(map.get("field"), Some(&json!("email")));
        assert_eq!(map.get("code"), Some(&json!(4001)));

        let keys: Vec<_> = (&error).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["field", "message", "code"]);
    }

    #[test]
    fn test_violation_message_from_rule() {
        let rule = Rule::new("name", "string:%d..%d")
            .with_argument(vec![json!(3), json!(10)])
            .with_message("Name must have %d to %d characters")
            .with_code(42);

        let violation = RuleViolation::from_rule(&rule, None);
        assert_eq!(violation.field(), "name");
        assert_eq!(violation.message(), "Name must have 3 to 10 characters");
        assert_eq!(violation.code(), 42);
    }

    #[test]
    fn test_violation_prefixes_truncated_value() {
        let rule = Rule::new("bio", "string:..%d")
            .with_argument(vec![json!(5)])
            .with_message("At most %d characters");
        let long = "x".repeat(100);

        let violation = RuleViolation::from_rule(&rule, Some(&json!(long)));
        let expected_preview = format!("'{}\u{2026}' is invalid value: ", "x".repeat(59));
        assert!(violation.message().starts_with(&expected_preview));
        assert!(violation.message().ends_with("At most 5 characters"));
    }

    #[test]
    fn test_empty_value_has_no_prefix() {
        let rule = Rule::new("bio", "required").with_message("Required");
        let violation = RuleViolation::from_rule(&rule, Some(&json!("")));
        assert_eq!(violation.message(), "Required");
    }
}
