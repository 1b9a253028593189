//! Rule validator.
//!
//! Built-in rule kinds dispatch to dedicated check functions through a
//! table fixed at construction. Every other rule is a type-expression
//! template: the rule argument is substituted into it and the result is
//! evaluated by [`crate::validation::expression::is_type`].

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::validation::error::{RuleViolation, ValidatorError};
use crate::validation::expression::{is_email, is_type, is_url};
use crate::validation::format::{is_truthy, render, vsprintf};
use crate::validation::rule::{Expression, Rule, RuleKind};

static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .case_insensitive(true)
        .build()
        .expect("uuid regex is valid")
});

/// A check for one built-in rule kind.
pub type Check = fn(&Value, &Rule) -> Result<(), ValidatorError>;

/// Evaluates rules against values.
///
/// The dispatch table is immutable once built, so a validator can be shared
/// across request handlers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Validator {
    handlers: HashMap<RuleKind, Check>,
}

impl Validator {
    /// Validator with every built-in check registered.
    pub fn new() -> Self {
        Self::empty()
            .with_handler(RuleKind::Required, validate_required)
            .with_handler(RuleKind::Email, validate_email)
            .with_handler(RuleKind::Url, validate_url)
            .with_handler(RuleKind::Regexp, validate_regexp)
            .with_handler(RuleKind::Equal, validate_equality)
            .with_handler(RuleKind::Uuid, validate_uuid)
    }

    /// Validator with an empty dispatch table.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register (or replace) the check for a rule kind.
    pub fn with_handler(mut self, kind: RuleKind, check: Check) -> Self {
        self.handlers.insert(kind, check);
        self
    }

    /// Check `value` against `rule`.
    pub fn validate(&self, value: &Value, rule: &Rule) -> Result<(), ValidatorError> {
        match rule.expression() {
            Expression::Kind(kind) => {
                let check = self.handlers.get(kind).ok_or_else(|| {
                    ValidatorError::InvalidState(format!(
                        "Handle for expression {} not found",
                        kind.as_str()
                    ))
                })?;
                check(value, rule)
            }
            Expression::Pattern(template) => {
                let expression = vsprintf(template, rule.argument());
                if is_type(value, &expression)? {
                    Ok(())
                } else {
                    Err(RuleViolation::from_rule(rule, None).into())
                }
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

fn violation(rule: &Rule) -> ValidatorError {
    RuleViolation::from_rule(rule, None).into()
}

fn validate_required(value: &Value, rule: &Rule) -> Result<(), ValidatorError> {
    let filled = match value {
        Value::Bool(_) | Value::Number(_) => true,
        other => is_truthy(other) || other.as_str() == Some("0"),
    };
    if filled {
        Ok(())
    } else {
        Err(violation(rule))
    }
}

fn validate_email(value: &Value, rule: &Rule) -> Result<(), ValidatorError> {
    if is_email(value) {
        Ok(())
    } else {
        Err(violation(rule))
    }
}

fn validate_url(value: &Value, rule: &Rule) -> Result<(), ValidatorError> {
    if is_url(value) {
        Ok(())
    } else {
        Err(violation(rule))
    }
}

fn validate_regexp(value: &Value, rule: &Rule) -> Result<(), ValidatorError> {
    let pattern = rule.argument().first().and_then(Value::as_str).ok_or_else(|| {
        ValidatorError::InvalidArgument(
            "No regular expression found in pattern validation rule".to_string(),
        )
    })?;
    let regex = compile_pattern(pattern)?;

    if (value.is_string() || value.is_number()) && regex.is_match(&render(value)) {
        Ok(())
    } else {
        Err(violation(rule))
    }
}

fn validate_equality(value: &Value, rule: &Rule) -> Result<(), ValidatorError> {
    if rule.argument().contains(value) {
        Ok(())
    } else {
        Err(violation(rule))
    }
}

fn validate_uuid(value: &Value, rule: &Rule) -> Result<(), ValidatorError> {
    if value.as_str().is_some_and(|s| UUID_REGEX.is_match(s)) {
        Ok(())
    } else {
        Err(violation(rule))
    }
}

/// Compile a pattern, accepting both bare regexes and delimited ones with
/// trailing flags (`/^\d+$/i`).
fn compile_pattern(pattern: &str) -> Result<Regex, ValidatorError> {
    let source = match delimited(pattern) {
        Some((body, flags)) if flags.is_empty() => body.to_string(),
        Some((body, flags)) => format!("(?{flags}){body}"),
        None => pattern.to_string(),
    };
    Regex::new(&source).map_err(|e| {
        ValidatorError::InvalidArgument(format!("Invalid regular expression '{pattern}': {e}"))
    })
}

fn delimited(pattern: &str) -> Option<(&str, String)> {
    let rest = pattern.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let flags = &rest[end + 1..];
    if !flags.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'x' | 'u')) {
        return None;
    }
    // `u` is implied by the regex crate
    Some((&rest[..end], flags.chars().filter(|c| *c != 'u').collect()))
}
