//! Positional printf-style substitution used for rule messages and
//! type-expression templates.
//!
//! Supported conversions: `%s`, `%d`/`%i`/`%u`, `%f` (with optional
//! `.N` precision), explicit positions (`%2$s`) and the `%%` escape.
//! Missing arguments render as an empty string.

use serde_json::Value;

/// Substitute `args` into `template` positionally.
pub fn vsprintf(template: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_arg = 0usize;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut spec = String::new();
        while let Some(&p) = chars.peek() {
            if p.is_ascii_digit() || p == '.' || p == '$' {
                spec.push(p);
                chars.next();
            } else {
                break;
            }
        }

        let Some(conversion) = chars.next() else {
            out.push('%');
            out.push_str(&spec);
            break;
        };

        if conversion == '%' && spec.is_empty() {
            out.push('%');
            continue;
        }

        let (position, precision) = parse_spec(&spec);
        let index = match position {
            Some(explicit) => explicit.saturating_sub(1),
            None => {
                let current = next_arg;
                next_arg += 1;
                current
            }
        };
        let arg = args.get(index);

        match conversion {
            's' => out.push_str(&arg.map(render).unwrap_or_default()),
            'd' | 'i' | 'u' => out.push_str(&arg.map(|v| to_integer(v).to_string()).unwrap_or_default()),
            'f' | 'F' => {
                let precision = precision.unwrap_or(6);
                if let Some(v) = arg {
                    out.push_str(&format!("{:.*}", precision, to_float(v)));
                }
            }
            other => {
                out.push('%');
                out.push_str(&spec);
                out.push(other);
            }
        }
    }

    out
}

fn parse_spec(spec: &str) -> (Option<usize>, Option<usize>) {
    let (position, rest) = match spec.split_once('$') {
        Some((pos, rest)) => (pos.parse().ok(), rest),
        None => (None, spec),
    };
    let precision = rest.split_once('.').and_then(|(_, p)| p.parse().ok());
    (position, precision)
}

/// Render a value the way a string conversion does: strings verbatim,
/// `true` as `1`, `false`/null as empty, containers as compact JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether a value counts as "filled" (non-null, non-empty, non-zero).
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn to_integer(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or_default(),
        Value::Bool(b) => i64::from(*b),
        Value::String(s) => leading_number(s).trunc() as i64,
        _ => 0,
    }
}

fn to_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => leading_number(s),
        _ => 0.0,
    }
}

fn leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    s[..end].parse().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positional_substitution() {
        let out = vsprintf("string:%d..%d", &[json!(3), json!(10)]);
        assert_eq!(out, "string:3..10");
    }

    #[test]
    fn test_string_and_escape() {
        let out = vsprintf("100%% of %s", &[json!("tests")]);
        assert_eq!(out, "100% of tests");
    }

    #[test]
    fn test_explicit_positions_and_precision() {
        let out = vsprintf("%2$s before %1$s, %.2f", &[json!("a"), json!("b"), json!(1.5)]);
        assert_eq!(out, "b before a, 1.50");
    }

    #[test]
    fn test_missing_argument_renders_empty() {
        assert_eq!(vsprintf("value: %s!", &[]), "value: !");
    }

    #[test]
    fn test_integer_conversion_of_strings() {
        assert_eq!(vsprintf("%d", &[json!("42abc")]), "42");
        assert_eq!(vsprintf("%d", &[json!(7.9)]), "7");
    }
}
