//! Validation rules.
//!
//! A [`Rule`] is one constraint attached to one field. Rules are built once
//! (usually while a presenter declares its input) and never mutated after.

use std::fmt;

use serde_json::Value;

/// Type expression: integer value.
pub const INTEGER: &str = "int";
/// Type expression: floating point value.
pub const FLOAT: &str = "float";
/// Type expression template: string of at least `%d` characters.
pub const MIN_LENGTH: &str = "string:%d..";
/// Type expression template: string of at most `%d` characters.
pub const MAX_LENGTH: &str = "string:..%d";
/// Type expression template: string length between two bounds.
pub const LENGTH: &str = "string:%d..%d";
/// Type expression template: numeric value between two bounds.
pub const RANGE: &str = "numeric:%d..%d";

/// Built-in rule kinds with dedicated check functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Required,
    Email,
    Url,
    Regexp,
    Equal,
    Uuid,
}

impl RuleKind {
    pub const ALL: [RuleKind; 6] = [
        RuleKind::Required,
        RuleKind::Email,
        RuleKind::Url,
        RuleKind::Regexp,
        RuleKind::Equal,
        RuleKind::Uuid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Email => "email",
            RuleKind::Url => "url",
            RuleKind::Regexp => "regexp",
            RuleKind::Equal => "equal",
            RuleKind::Uuid => "uuid",
        }
    }

    /// Look up a kind by its keyword (case-insensitive).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(keyword))
    }
}

/// What a rule checks: a built-in kind or a type-expression template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Kind(RuleKind),
    /// Template such as `string:%d..%d`, filled from the rule argument.
    Pattern(String),
}

impl Expression {
    pub fn kind(&self) -> Option<RuleKind> {
        match self {
            Expression::Kind(kind) => Some(*kind),
            Expression::Pattern(_) => None,
        }
    }
}

impl From<RuleKind> for Expression {
    fn from(kind: RuleKind) -> Self {
        Expression::Kind(kind)
    }
}

impl From<&str> for Expression {
    fn from(expression: &str) -> Self {
        match RuleKind::from_keyword(expression) {
            Some(kind) => Expression::Kind(kind),
            None => Expression::Pattern(expression.to_string()),
        }
    }
}

impl From<String> for Expression {
    fn from(expression: String) -> Self {
        Expression::from(expression.as_str())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Kind(kind) => f.write_str(kind.as_str()),
            Expression::Pattern(pattern) => f.write_str(pattern),
        }
    }
}

/// A single constraint on a named field.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    field: String,
    expression: Expression,
    argument: Vec<Value>,
    message: String,
    code: i64,
}

impl Rule {
    /// Create a rule with an empty message, no argument and code 0.
    pub fn new(field: impl Into<String>, expression: impl Into<Expression>) -> Self {
        Self {
            field: field.into(),
            expression: expression.into(),
            argument: Vec::new(),
            message: String::new(),
            code: 0,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_argument(mut self, argument: Vec<Value>) -> Self {
        self.argument = argument;
        self
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn argument(&self) -> &[Value] {
        &self.argument
    }

    /// Message template; `%s`/`%d` placeholders are filled from the argument.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expression_from_keyword() {
        assert_eq!(Expression::from("email"), Expression::Kind(RuleKind::Email));
        assert_eq!(Expression::from("UUID"), Expression::Kind(RuleKind::Uuid));
        assert_eq!(
            Expression::from(LENGTH),
            Expression::Pattern("string:%d..%d".into())
        );
    }

    #[test]
    fn test_rule_builder() {
        let rule = Rule::new("age", RANGE)
            .with_argument(vec![json!(18), json!(99)])
            .with_message("Age must be between %d and %d")
            .with_code(4221);

        assert_eq!(rule.field(), "age");
        assert_eq!(rule.argument().len(), 2);
        assert_eq!(rule.code(), 4221);
        assert_eq!(rule.expression().to_string(), "numeric:%d..%d");
    }
}
