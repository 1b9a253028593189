//! Validated field: a name plus its ordered rules.

use std::sync::Arc;

use serde_json::Value;

use crate::validation::error::{FieldError, ValidatorError};
use crate::validation::rule::{Expression, Rule, RuleKind};
use crate::validation::validator::Validator;

#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    rules: Vec<Rule>,
    validator: Arc<Validator>,
}

impl Field {
    pub fn new(name: impl Into<String>, validator: Arc<Validator>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            validator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Add a rule without argument and with code 0.
    pub fn add_rule(
        &mut self,
        expression: impl Into<Expression>,
        message: impl Into<String>,
    ) -> &mut Self {
        self.add_rule_with(expression, message, Vec::new(), 0)
    }

    pub fn add_rule_with(
        &mut self,
        expression: impl Into<Expression>,
        message: impl Into<String>,
        argument: Vec<Value>,
        code: i64,
    ) -> &mut Self {
        let rule = Rule::new(self.name.clone(), expression)
            .with_message(message)
            .with_argument(argument)
            .with_code(code);
        self.rules.push(rule);
        self
    }

    /// A field is required when it carries a `required` rule.
    pub fn is_required(&self) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.expression().kind() == Some(RuleKind::Required))
    }

    /// Check `value` against every rule, collecting violations in rule order.
    ///
    /// Optional fields with a missing or null value are not checked.
    /// Configuration errors abort immediately.
    pub fn validate(&self, value: Option<&Value>) -> Result<Vec<FieldError>, ValidatorError> {
        let value = match value {
            Some(Value::Null) | None if !self.is_required() => return Ok(Vec::new()),
            Some(value) => value,
            None => &Value::Null,
        };

        let mut errors = Vec::new();
        for rule in &self.rules {
            match self.validator.validate(value, rule) {
                Ok(()) => {}
                Err(ValidatorError::Violation(violation)) => errors.push(violation.into()),
                Err(other) => return Err(other),
            }
        }
        Ok(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(name: &str) -> Field {
        Field::new(name, Arc::new(Validator::new()))
    }

    #[test]
    fn test_collects_every_violation() {
        let mut name = field("name");
        name.add_rule(RuleKind::Required, "Name is required")
            .add_rule_with("string:%d..", "At least %d characters", vec![json!(3)], 11)
            .add_rule(RuleKind::Email, "Not an email");

        let errors = name.validate(Some(&json!("ab"))).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message(), "At least 3 characters");
        assert_eq!(errors[0].code(), 11);
        assert_eq!(errors[1].message(), "Not an email");
    }

    #[test]
    fn test_optional_missing_value_is_skipped() {
        let mut email = field("email");
        email.add_rule(RuleKind::Email, "Not an email");

        assert!(email.validate(None).unwrap().is_empty());
        assert!(email.validate(Some(&Value::Null)).unwrap().is_empty());
        assert_eq!(email.validate(Some(&json!("x"))).unwrap().len(), 1);
    }

    #[test]
    fn test_required_missing_value_fails() {
        let mut email = field("email");
        email.add_rule(RuleKind::Required, "Email is required");

        let errors = email.validate(None).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(), "email");
    }

    #[test]
    fn test_configuration_error_propagates() {
        let mut pattern = field("code");
        pattern.add_rule(RuleKind::Regexp, "Bad code");

        let err = pattern.validate(Some(&json!("x"))).unwrap_err();
        assert!(matches!(err, ValidatorError::InvalidArgument(_)));
    }
}
