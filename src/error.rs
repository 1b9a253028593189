//! Request-level error taxonomy.
//!
//! Every error raised while processing a request ends up as an error
//! resource rendered through the regular mapper pipeline, so each variant
//! knows the status code it maps to.

use thiserror::Error;

use crate::mapping::MappingError;
use crate::validation::{FieldError, ValidatorError};

/// Status used when an error code is not a valid HTTP status.
pub const FALLBACK_STATUS: u16 = 400;

#[derive(Debug, Error)]
pub enum RestError {
    /// Client-caused failure (4xx), optionally with field-level errors.
    #[error("{message}")]
    BadRequest {
        code: i64,
        message: String,
        errors: Vec<FieldError>,
    },

    /// Authentication or authorization failure.
    #[error("{message}")]
    Security { code: i64, message: String },

    /// Server-side precondition violated (missing mapper, missing handler).
    #[error("{0}")]
    InvalidState(String),

    /// Malformed routing input, such as an unsupported request method.
    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Validator(#[from] ValidatorError),
}

impl RestError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::client(400, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::client(404, message)
    }

    pub fn method_not_supported(message: impl Into<String>) -> Self {
        Self::client(405, message)
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::client(415, message)
    }

    /// 422 carrying every failed rule.
    pub fn unprocessable_entity(errors: Vec<FieldError>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: 422,
            message: message.into(),
            errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Security {
            code: 401,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Security {
            code: 403,
            message: message.into(),
        }
    }

    fn client(code: i64, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Numeric error code rendered in the error body.
    pub fn code(&self) -> i64 {
        match self {
            RestError::BadRequest { code, .. } | RestError::Security { code, .. } => *code,
            RestError::InvalidArgument(_) => 400,
            RestError::InvalidState(_) | RestError::Mapping(_) | RestError::Validator(_) => 500,
        }
    }

    /// HTTP status: the code when it lies in `100..=599`, otherwise 400.
    pub fn status(&self) -> u16 {
        match self.code() {
            code @ 100..=599 => code as u16,
            _ => FALLBACK_STATUS,
        }
    }

    /// Field-level errors, empty unless validation failed.
    pub fn errors(&self) -> &[FieldError] {
        match self {
            RestError::BadRequest { errors, .. } => errors,
            _ => &[],
        }
    }
}

/// Result type for request processing.
pub type RestResult<T> = Result<T, RestError>;
