//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route definitions (masks compile, methods known, actions set)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{AppConfig, ResourceRouteConfig};
use crate::routing::matcher::Mask;
use crate::routing::method::Method;

/// A single semantic problem, located by its config path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be > 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }
    if config.negotiation.default_content_type.trim().is_empty() {
        errors.push(ValidationError::new(
            "negotiation.default_content_type",
            "must not be empty",
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }
    if let Some(prefix) = &config.routing.strict_prefix {
        if prefix.trim_matches('/').is_empty() {
            errors.push(ValidationError::new("routing.strict_prefix", "must not be empty"));
        }
    }

    for (i, route) in config.routing.resources.iter().enumerate() {
        errors.extend(validate_route(&format!("routing.resources[{i}]"), route));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Problems with one resource route, located under `path`.
pub fn validate_route(path: &str, route: &ResourceRouteConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Err(e) = Mask::parse(&route.mask) {
        errors.push(ValidationError::new(format!("{path}.mask"), e.to_string()));
    }
    if route.presenter.trim().is_empty() {
        errors.push(ValidationError::new(format!("{path}.presenter"), "must not be empty"));
    }
    if route.actions.is_empty() {
        errors.push(ValidationError::new(format!("{path}.actions"), "must map at least one method"));
    }
    for (method, action) in &route.actions {
        if Method::from_name(method).is_none() {
            errors.push(ValidationError::new(
                format!("{path}.actions.{method}"),
                "unknown HTTP method",
            ));
        }
        if action.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{path}.actions.{method}"),
                "action must not be empty",
            ));
        }
    }

    errors
}
