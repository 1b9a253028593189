//! Route mask matching.
//!
//! # Responsibilities
//! - Compile masks such as `api/items[/<id \d+>]` into anchored regexes
//! - Extract named parameters from a request path
//! - Build a path back from parameters
//!
//! # Design Decisions
//! - Masks are compiled once, at route construction
//! - Leading and trailing slashes are not significant
//! - `<name>` matches one path segment; `<name pattern>` uses the pattern
//! - `[...]` marks an optional part; parts may nest

use std::collections::BTreeMap;

use regex::Regex;

use crate::error::{RestError, RestResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param { name: String },
    Optional(Vec<Token>),
}

/// Compiled route mask.
#[derive(Debug, Clone)]
pub struct Mask {
    source: String,
    tokens: Vec<Token>,
    regex: Regex,
    names: Vec<String>,
}

impl Mask {
    pub fn parse(mask: &str) -> RestResult<Self> {
        let source = mask.trim_matches('/').to_string();
        let mut chars = source.chars().peekable();
        let mut names = Vec::new();
        let mut pattern = String::from("^");
        let tokens = parse_tokens(&mut chars, &mut pattern, &mut names, 0)?;
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| {
            RestError::InvalidArgument(format!("Invalid route mask '{mask}': {e}"))
        })?;

        Ok(Self {
            source,
            tokens,
            regex,
            names,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Parameters captured from `path`, or `None` when it does not match.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let captures = self.regex.captures(path.trim_matches('/'))?;
        Some(
            self.names
                .iter()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    /// Path for `params`, with a leading slash. `None` when a required
    /// parameter is missing.
    pub fn build(&self, params: &BTreeMap<String, String>) -> Option<String> {
        let mut out = String::from("/");
        build_tokens(&self.tokens, params, &mut out).then_some(out)
    }
}

fn parse_tokens(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    pattern: &mut String,
    names: &mut Vec<String>,
    depth: usize,
) -> RestResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut literal = String::new();

    let flush = |literal: &mut String, tokens: &mut Vec<Token>, pattern: &mut String| {
        if !literal.is_empty() {
            pattern.push_str(&regex::escape(literal));
            tokens.push(Token::Literal(std::mem::take(literal)));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '<' => {
                flush(&mut literal, &mut tokens, pattern);
                let mut body = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '>' {
                        closed = true;
                        break;
                    }
                    body.push(c);
                }
                if !closed {
                    return Err(RestError::InvalidArgument(
                        "Unterminated placeholder in route mask".to_string(),
                    ));
                }

                let (name, param_pattern) = match body.trim().split_once(' ') {
                    Some((name, p)) => (name.to_string(), p.trim().to_string()),
                    None => (body.trim().to_string(), "[^/]+".to_string()),
                };
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(RestError::InvalidArgument(format!(
                        "Invalid placeholder name '{name}' in route mask"
                    )));
                }
                pattern.push_str(&format!("(?P<{name}>{param_pattern})"));
                names.push(name.clone());
                tokens.push(Token::Param { name });
            }
            '[' => {
                flush(&mut literal, &mut tokens, pattern);
                pattern.push_str("(?:");
                let inner = parse_tokens(chars, pattern, names, depth + 1)?;
                pattern.push_str(")?");
                tokens.push(Token::Optional(inner));
            }
            ']' if depth > 0 => {
                flush(&mut literal, &mut tokens, pattern);
                return Ok(tokens);
            }
            ']' => {
                return Err(RestError::InvalidArgument(
                    "Unbalanced ']' in route mask".to_string(),
                ));
            }
            other => literal.push(other),
        }
    }

    if depth > 0 {
        return Err(RestError::InvalidArgument(
            "Unbalanced '[' in route mask".to_string(),
        ));
    }
    flush(&mut literal, &mut tokens, pattern);
    Ok(tokens)
}

/// Append `tokens` to `out`. Returns false when a parameter is missing.
fn build_tokens(tokens: &[Token], params: &BTreeMap<String, String>, out: &mut String) -> bool {
    for token in tokens {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Param { name } => match params.get(name) {
                Some(value) => out.push_str(value),
                None => return false,
            },
            Token::Optional(inner) => {
                let mut part = String::new();
                if build_tokens(inner, params, &mut part) {
                    out.push_str(&part);
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_mask() {
        let mask = Mask::parse("/api/items/").unwrap();
        assert!(mask.matches("/api/items").is_some());
        assert!(mask.matches("api/items/").is_some());
        assert!(mask.matches("/api/items/1").is_none());
    }

    #[test]
    fn test_placeholders() {
        let mask = Mask::parse("api/items/<id>").unwrap();
        let params = mask.matches("/api/items/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
        assert!(mask.matches("/api/items/42/extra").is_none());
        assert_eq!(mask.names(), ["id".to_string()]);
    }

    #[test]
    fn test_placeholder_pattern() {
        let mask = Mask::parse(r"api/items/<id \d+>").unwrap();
        assert!(mask.matches("/api/items/7").is_some());
        assert!(mask.matches("/api/items/seven").is_none());
    }

    #[test]
    fn test_optional_part() {
        let mask = Mask::parse("api/items[/<id>]").unwrap();
        assert!(mask.matches("/api/items").unwrap().is_empty());
        assert_eq!(
            mask.matches("/api/items/3").unwrap().get("id").map(String::as_str),
            Some("3")
        );
    }

    #[test]
    fn test_build() {
        let mask = Mask::parse("api/items[/<id>]").unwrap();
        let mut params = BTreeMap::new();
        assert_eq!(mask.build(&params), Some("/api/items".to_string()));
        params.insert("id".to_string(), "3".to_string());
        assert_eq!(mask.build(&params), Some("/api/items/3".to_string()));

        let required = Mask::parse("users/<user>/posts").unwrap();
        assert_eq!(required.build(&BTreeMap::new()), None);
    }

    #[test]
    fn test_malformed_masks() {
        assert!(Mask::parse("api/[items").is_err());
        assert!(Mask::parse("api/items]").is_err());
        assert!(Mask::parse("api/<id").is_err());
        assert!(Mask::parse("api/<>").is_err());
    }
}
