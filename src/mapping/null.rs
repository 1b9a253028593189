//! No-op mapper.

use serde_json::{Map, Value};

use crate::mapping::{Mapper, MappingError};

/// Passes string payloads through untouched and parses nothing.
///
/// Non-string payloads have no raw form and are written as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMapper;

impl Mapper for NullMapper {
    fn stringify(&self, data: &Value, _pretty_print: bool) -> Result<String, MappingError> {
        match data {
            Value::String(raw) => Ok(raw.clone()),
            other => Ok(other.to_string()),
        }
    }

    fn parse(&self, _raw: &str) -> Result<Map<String, Value>, MappingError> {
        Ok(Map::new())
    }
}
