//! `application/x-www-form-urlencoded` mapper.
//!
//! Nested data is flattened with bracket keys (`user[name]`, `tags[0]`).
//! Parsing reverses the convention: `a[b]=1` builds a nested mapping and
//! `l[]=x&l[]=y` (or `l[0]=x&l[1]=y`) builds a list. Nesting deeper than
//! [`MAX_NESTING`] brackets is not expanded.

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::mapping::{Mapper, MappingError};

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryMapper;

impl Mapper for QueryMapper {
    fn stringify(&self, data: &Value, _pretty_print: bool) -> Result<String, MappingError> {
        if !(data.is_object() || data.is_array()) {
            return Err(MappingError::Malformed(
                "Query string mapping needs a mapping or a list".to_string(),
            ));
        }

        let mut pairs = Vec::new();
        flatten("", data, &mut pairs);
        Ok(form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish())
    }

    fn parse(&self, raw: &str) -> Result<Map<String, Value>, MappingError> {
        Ok(parse_query(raw))
    }
}

/// Decode a query string into a (possibly nested) mapping.
pub fn parse_query(raw: &str) -> Map<String, Value> {
    let mut root = Value::Object(Map::new());
    let raw = raw.strip_prefix('?').unwrap_or(raw);

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        let segments = split_key(&key);
        if segments.first().map_or(true, |base| base.is_empty()) {
            continue;
        }
        assign(&mut root, &segments, value.into_owned());
    }

    match root {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn flatten(prefix: &str, value: &Value, pairs: &mut Vec<(String, String)>) {
    let child_key = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}[{key}]")
        }
    };

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(&child_key(key), child, pairs);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&child_key(&index.to_string()), child, pairs);
            }
        }
        Value::Null => {}
        Value::Bool(b) => pairs.push((prefix.to_string(), if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => pairs.push((prefix.to_string(), n.to_string())),
        Value::String(s) => pairs.push((prefix.to_string(), s.clone())),
    }
}

/// Deepest bracket nesting honoured in a key. Brackets past this depth
/// stay part of the last segment.
pub const MAX_NESTING: usize = 64;

/// `a[b][]` → `["a", "b", ""]`. Keys with unbalanced brackets stay literal.
fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };

    let mut segments = vec![key[..open].to_string()];
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        if segments.len() > MAX_NESTING {
            break;
        }
        let Some(close) = inner.find(']') else {
            break;
        };
        segments.push(inner[..close].to_string());
        rest = &inner[close + 1..];
    }

    if segments.len() == 1 {
        return vec![key.to_string()];
    }
    if segments.len() > MAX_NESTING && !rest.is_empty() {
        if let Some(last) = segments.last_mut() {
            last.push_str(rest);
        }
    }
    segments
}

fn assign(root: &mut Value, segments: &[String], value: String) {
    let mut slot = root;
    for segment in segments {
        slot = child(slot, segment);
    }
    *slot = Value::String(value);
}

/// Slot for `segment` inside `container`, creating the container when it
/// is a scalar. Lists stay lists while indices arrive densely from 0;
/// any other key turns them into a mapping.
fn child<'a>(container: &'a mut Value, segment: &str) -> &'a mut Value {
    if !(container.is_object() || container.is_array()) {
        *container = if segment.is_empty() || segment == "0" {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }

    let index = match &*container {
        Value::Array(items) if segment.is_empty() => Some(items.len()),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .filter(|i| *i <= items.len() && i.to_string() == segment),
        _ => None,
    };
    if index.is_none() && container.is_array() {
        if let Value::Array(items) = std::mem::take(container) {
            let map = items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect();
            *container = Value::Object(map);
        }
    }

    match container {
        Value::Array(items) => {
            let index = index.unwrap_or(items.len());
            if index >= items.len() {
                items.push(Value::Null);
            }
            let last = items.len() - 1;
            &mut items[index.min(last)]
        }
        Value::Object(map) => {
            let key = if segment.is_empty() {
                map.len().to_string()
            } else {
                segment.to_string()
            };
            map.entry(key).or_insert(Value::Null)
        }
        other => other,
    }
}
