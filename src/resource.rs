//! REST resource envelope.
//!
//! A resource is the payload handed to a mapper, independent of the wire
//! format. Keys keep their insertion order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RestError;

/// JSON content type.
pub const JSON: &str = "application/json";
/// JSONP content type.
pub const JSONP: &str = "application/javascript";
/// Query string content type.
pub const QUERY: &str = "application/x-www-form-urlencoded";
/// Plain text content type.
pub const TEXT: &str = "text/plain";
/// Registry key used when no content type is given.
pub const NULL: &str = "NULL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource {
    data: Map<String, Value>,
}

impl Resource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Error envelope: `{code, status: "error", message, errors?}`.
    ///
    /// `errors` is present only when the error carries field-level errors.
    pub fn from_error(error: &RestError) -> Self {
        let mut resource = Self::new();
        resource.set("code", error.code());
        resource.set("status", "error");
        resource.set("message", error.to_string());

        if !error.errors().is_empty() {
            let errors = error
                .errors()
                .iter()
                .map(|e| Value::Object(e.to_map()))
                .collect::<Vec<_>>();
            resource.set("errors", errors);
        }
        resource
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Whether `key` is set to a non-null value.
    pub fn contains(&self, key: &str) -> bool {
        self.data.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Append under the next numeric key (the current length).
    pub fn push(&mut self, value: impl Into<Value>) {
        let key = self.data.len().to_string();
        self.data.insert(key, value.into());
    }

    /// Remove `key`, keeping the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.data.iter()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.data)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw).map(Self::from_map)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }
}

impl From<Map<String, Value>> for Resource {
    fn from(data: Map<String, Value>) -> Self {
        Self::from_map(data)
    }
}

impl<'a> IntoIterator for &'a Resource {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;
    use serde_json::json;

    #[test]
    fn test_keys_keep_insertion_order() {
        let mut resource = Resource::new();
        resource.set("zeta", 1);
        resource.set("alpha", 2);
        resource.set("mid", 3);
        resource.remove("zeta");
        resource.set("last", 4);

        let keys: Vec<_> = resource.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "mid", "last"]);
    }

    #[test]
    fn test_contains_ignores_null() {
        let mut resource = Resource::new();
        resource.set("name", "John");
        resource.set("nothing", Value::Null);

        assert!(resource.contains("name"));
        assert!(!resource.contains("nothing"));
        assert!(!resource.contains("missing"));
    }

    #[test]
    fn test_push_uses_length_as_key() {
        let mut resource = Resource::new();
        resource.push("a");
        resource.push("b");
        assert_eq!(resource.get("1"), Some(&json!("b")));
    }

    #[test]
    fn test_json_round_trip() {
        let resource = Resource::from_json(r#"{"b":1,"a":[1,2]}"#).unwrap();
        assert_eq!(resource.to_json().unwrap(), r#"{"b":1,"a":[1,2]}"#);
        assert!(Resource::from_json("[1,2]").is_err());
    }

    #[test]
    fn test_error_resource_shape() {
        let resource = Resource::from_error(&RestError::not_found("not found"));
        assert_eq!(
            resource.to_json().unwrap(),
            r#"{"code":404,"status":"error","message":"not found"}"#
        );

        let invalid = RestError::unprocessable_entity(
            vec![FieldError::new("email", "Invalid email", 7)],
            "Validation Failed: Invalid email",
        );
        let resource = Resource::from_error(&invalid);
        assert_eq!(
            resource.get("errors"),
            Some(&json!([{"field": "email", "message": "Invalid email", "code": 7}]))
        );
    }
}
