//! Request input bound to a validation scope.

use serde_json::{Map, Value};

use crate::validation::error::{FieldError, ValidatorError};
use crate::validation::field::Field;
use crate::validation::scope::ValidationScope;

/// Input data of one request together with the rules declared for it.
#[derive(Debug, Clone)]
pub struct Input {
    data: Map<String, Value>,
    scope: ValidationScope,
}

impl Input {
    pub fn new(data: Map<String, Value>, scope: ValidationScope) -> Self {
        Self { data, scope }
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Declare rules for `name`.
    pub fn field(&mut self, name: &str) -> &mut Field {
        self.scope.field(name)
    }

    /// Every failing rule for the bound data.
    pub fn validate(&self) -> Result<Vec<FieldError>, ValidatorError> {
        self.scope.errors(&self.data)
    }

    pub fn is_valid(&self) -> Result<bool, ValidatorError> {
        self.scope.is_valid(&self.data)
    }

    pub fn validation_scope(&self) -> &ValidationScope {
        &self.scope
    }
}
