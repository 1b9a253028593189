//! Validation scope: the named fields declared for one input.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::validation::error::{FieldError, ValidatorError};
use crate::validation::field::Field;
use crate::validation::validator::Validator;

/// Named set of fields, enumerated in declaration order.
#[derive(Debug, Clone)]
pub struct ValidationScope {
    validator: Arc<Validator>,
    fields: Vec<Field>,
}

impl ValidationScope {
    pub fn new(validator: Arc<Validator>) -> Self {
        Self {
            validator,
            fields: Vec::new(),
        }
    }

    /// Get the field called `name`, creating it on first reference.
    pub fn field(&mut self, name: &str) -> &mut Field {
        let index = match self.fields.iter().position(|f| f.name() == name) {
            Some(index) => index,
            None => {
                self.fields.push(Field::new(name, self.validator.clone()));
                self.fields.len() - 1
            }
        };
        &mut self.fields[index]
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The first failure in field/rule order, or `None` when `data` is valid.
    pub fn validate(&self, data: &Map<String, Value>) -> Result<Option<FieldError>, ValidatorError> {
        for field in &self.fields {
            if let Some(first) = field.validate(data.get(field.name()))?.into_iter().next() {
                return Ok(Some(first));
            }
        }
        Ok(None)
    }

    /// Every failure across all fields, in field/rule order.
    pub fn errors(&self, data: &Map<String, Value>) -> Result<Vec<FieldError>, ValidatorError> {
        let mut errors = Vec::new();
        for field in &self.fields {
            errors.extend(field.validate(data.get(field.name()))?);
        }
        Ok(errors)
    }

    pub fn is_valid(&self, data: &Map<String, Value>) -> Result<bool, ValidatorError> {
        Ok(self.validate(data)?.is_none())
    }
}

/// Creates fresh scopes, one per validated input.
pub trait ValidationScopeFactory: Send + Sync {
    fn create(&self) -> ValidationScope;
}

/// Factory handing every scope the same shared validator.
#[derive(Debug, Clone, Default)]
pub struct DefaultScopeFactory {
    validator: Arc<Validator>,
}

impl DefaultScopeFactory {
    pub fn new(validator: Arc<Validator>) -> Self {
        Self { validator }
    }
}

impl ValidationScopeFactory for DefaultScopeFactory {
    fn create(&self) -> ValidationScope {
        ValidationScope::new(self.validator.clone())
    }
}
