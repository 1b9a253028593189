//! Mapper registry keyed by content type.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RestError;
use crate::mapping::{JsonMapper, Mapper, NullMapper, QueryMapper};
use crate::resource;

#[derive(Debug, Clone, Default)]
pub struct MapperContext {
    services: HashMap<String, Arc<dyn Mapper>>,
}

impl MapperContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with JSON, query string and the `NULL` no-op mapper.
    pub fn with_defaults() -> Self {
        let mut context = Self::new();
        context.add_mapper(resource::JSON, Arc::new(JsonMapper));
        context.add_mapper(resource::QUERY, Arc::new(QueryMapper));
        context.add_mapper(resource::NULL, Arc::new(NullMapper));
        context
    }

    /// Register `mapper` for `content_type`, replacing any previous one.
    pub fn add_mapper(&mut self, content_type: &str, mapper: Arc<dyn Mapper>) {
        self.services.insert(normalize(content_type), mapper);
    }

    /// Mapper for `content_type` (`mime[; params]`).
    ///
    /// Parameters are ignored and an empty type resolves to `NULL`. A miss
    /// is an [`RestError::InvalidState`].
    pub fn get_mapper(&self, content_type: &str) -> Result<Arc<dyn Mapper>, RestError> {
        let key = normalize(content_type);
        self.services.get(&key).cloned().ok_or_else(|| {
            RestError::InvalidState(format!("There is no mapper for Content-Type: {key}"))
        })
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.services.contains_key(&normalize(content_type))
    }
}

/// MIME type only: split on the first `;`, trim, empty becomes `NULL`.
pub fn normalize(content_type: &str) -> String {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    if mime.is_empty() {
        resource::NULL.to_string()
    } else {
        mime.to_string()
    }
}
