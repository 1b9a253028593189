//! Type-expression predicate.
//!
//! Rules that are not one of the built-in kinds carry a type expression
//! such as `int`, `string:3..10`, `numeric:..100` or `int|null`. The
//! expression is a `|`-separated list of alternatives; each alternative is a
//! type name optionally followed by `:range`, where range is `min..max`,
//! `min..`, `..max` or an exact `n`. Ranges bound string length (in
//! characters), numeric value or element count.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::validation::error::ValidatorError;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email regex is valid")
});

static NUMERIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]*[.]?[0-9]+$").expect("numeric regex is valid"));

static NUMERIC_INT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("numeric int regex is valid"));

/// Whether `value` is an e-mail address.
pub fn is_email(value: &Value) -> bool {
    value.as_str().is_some_and(|s| EMAIL_REGEX.is_match(s))
}

/// Whether `value` is an absolute `http` or `https` URL with a host.
pub fn is_url(value: &Value) -> bool {
    value
        .as_str()
        .and_then(|s| Url::parse(s).ok())
        .is_some_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}

/// Evaluate a type expression against `value`.
///
/// Unknown type names or malformed ranges are configuration errors and
/// surface as [`ValidatorError::InvalidState`].
pub fn is_type(value: &Value, expression: &str) -> Result<bool, ValidatorError> {
    for alternative in expression.split('|') {
        let (type_name, range) = match alternative.split_once(':') {
            Some((name, range)) => (name.trim(), Some(Range::parse(range)?)),
            None => (alternative.trim(), None),
        };

        if !matches_type(value, type_name)? {
            continue;
        }

        match (range, measure(value, type_name)) {
            (Some(range), Some(measure)) if !range.contains(measure) => continue,
            _ => return Ok(true),
        }
    }
    Ok(false)
}

fn matches_type(value: &Value, type_name: &str) -> Result<bool, ValidatorError> {
    let matched = match type_name.to_ascii_lowercase().as_str() {
        "int" | "integer" => value.as_i64().is_some() || value.as_u64().is_some(),
        "float" => matches!(value, Value::Number(n) if n.is_f64()),
        "number" => value.is_number(),
        "numeric" => {
            value.is_number() || value.as_str().is_some_and(|s| NUMERIC_REGEX.is_match(s))
        }
        "numericint" => {
            value.as_i64().is_some()
                || value.as_u64().is_some()
                || value.as_str().is_some_and(|s| NUMERIC_INT_REGEX.is_match(s))
        }
        "string" | "unicode" => value.is_string(),
        "bool" | "boolean" => value.is_boolean(),
        "array" => value.is_array() || value.is_object(),
        "list" => value.is_array(),
        "null" => value.is_null(),
        "scalar" => value.is_string() || value.is_number() || value.is_boolean(),
        "none" => is_none(value),
        "mixed" => true,
        "email" => is_email(value),
        "url" => is_url(value),
        "alnum" => char_class(value, |c| c.is_ascii_alphanumeric()),
        "alpha" => char_class(value, |c| c.is_ascii_alphabetic()),
        "digit" => char_class(value, |c| c.is_ascii_digit()),
        "lower" => char_class(value, |c| c.is_ascii_lowercase()),
        "upper" => char_class(value, |c| c.is_ascii_uppercase()),
        "space" => char_class(value, |c| c.is_ascii_whitespace()),
        "xdigit" => char_class(value, |c| c.is_ascii_hexdigit()),
        other => {
            return Err(ValidatorError::InvalidState(format!(
                "Unknown validation type '{other}'"
            )))
        }
    };
    Ok(matched)
}

fn is_none(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn char_class(value: &Value, class: impl Fn(char) -> bool) -> bool {
    value
        .as_str()
        .is_some_and(|s| !s.is_empty() && s.chars().all(class))
}

/// The quantity a range bounds for a given value, if any.
fn measure(value: &Value, type_name: &str) -> Option<f64> {
    match value {
        Value::String(s) if type_name.eq_ignore_ascii_case("numeric")
            || type_name.eq_ignore_ascii_case("numericint") =>
        {
            s.parse().ok()
        }
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Number(n) => n.as_f64(),
        Value::Array(items) => Some(items.len() as f64),
        Value::Object(map) => Some(map.len() as f64),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: Option<f64>,
    max: Option<f64>,
}

impl Range {
    fn parse(raw: &str) -> Result<Self, ValidatorError> {
        let bound = |s: &str| -> Result<Option<f64>, ValidatorError> {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse()
                .map(Some)
                .map_err(|_| ValidatorError::InvalidState(format!("Invalid range bound '{s}'")))
        };

        match raw.split_once("..") {
            Some((min, max)) => Ok(Self {
                min: bound(min)?,
                max: bound(max)?,
            }),
            None => {
                let exact = bound(raw)?;
                Ok(Self {
                    min: exact,
                    max: exact,
                })
            }
        }
    }

    fn contains(&self, measure: f64) -> bool {
        self.min.map_or(true, |min| measure >= min) && self.max.map_or(true, |max| measure <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_types() {
        assert!(is_type(&json!(5), "int").unwrap());
        assert!(!is_type(&json!(5.5), "int").unwrap());
        assert!(is_type(&json!(5.5), "float").unwrap());
        assert!(is_type(&json!("12.5"), "numeric").unwrap());
        assert!(!is_type(&json!("12a"), "numeric").unwrap());
        assert!(is_type(&json!("-12"), "numericint").unwrap());
        assert!(is_type(&json!(true), "bool").unwrap());
    }

    #[test]
    fn test_string_length_ranges() {
        assert!(is_type(&json!("abc"), "string:3..10").unwrap());
        assert!(!is_type(&json!("ab"), "string:3..10").unwrap());
        assert!(is_type(&json!("ab"), "string:..2").unwrap());
        assert!(is_type(&json!("ěšč"), "string:3").unwrap());
    }

    #[test]
    fn test_numeric_ranges() {
        assert!(is_type(&json!(18), "numeric:18..99").unwrap());
        assert!(!is_type(&json!(100), "numeric:18..99").unwrap());
        assert!(is_type(&json!("50"), "numeric:18..99").unwrap());
        assert!(!is_type(&json!("5"), "numeric:18..").unwrap());
    }

    #[test]
    fn test_alternatives() {
        assert!(is_type(&Value::Null, "int|null").unwrap());
        assert!(is_type(&json!(3), "int|null").unwrap());
        assert!(!is_type(&json!("x"), "int|null").unwrap());
    }

    #[test]
    fn test_array_counts() {
        assert!(is_type(&json!([1, 2]), "list:1..3").unwrap());
        assert!(!is_type(&json!([]), "list:1..").unwrap());
    }

    #[test]
    fn test_unknown_type_is_configuration_error() {
        let err = is_type(&json!(1), "whatever").unwrap_err();
        assert!(matches!(err, ValidatorError::InvalidState(_)));
    }

    #[test]
    fn test_email_and_url() {
        assert!(is_email(&json!("user@example.com")));
        assert!(!is_email(&json!("user@")));
        assert!(is_url(&json!("https://example.com/path")));
        assert!(!is_url(&json!("/relative/path")));
        assert!(!is_url(&json!("ftp://files.example.com/a.txt")));
        assert!(!is_url(&json!("mailto:john@example.com")));
        assert!(is_url(&json!("http://localhost:8080")));
    }
}
