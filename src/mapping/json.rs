//! JSON mapper.

use serde_json::{Map, Value};

use crate::mapping::{Mapper, MappingError};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMapper;

impl Mapper for JsonMapper {
    fn stringify(&self, data: &Value, pretty_print: bool) -> Result<String, MappingError> {
        let out = if pretty_print {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(out)
    }

    /// Parse an object body; an empty body is an empty mapping.
    fn parse(&self, raw: &str) -> Result<Map<String, Value>, MappingError> {
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(raw)? {
            Value::Object(map) => Ok(map),
            other => Err(MappingError::Malformed(format!(
                "JSON body must be an object, got {}",
                kind(&other)
            ))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
