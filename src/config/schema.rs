//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the API
//! server. All types derive Serde traits for deserialization from config
//! files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resource;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Route definitions.
    pub routing: RoutingConfig,

    /// Content negotiation settings.
    pub negotiation: NegotiationConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// Module assigned to every matched request.
    pub module: Option<String>,

    /// Prefix of the strict `<prefix>/<presenter>/...` route. Unset disables it.
    pub strict_prefix: Option<String>,

    /// Directory of `*.toml` route files, loaded in addition to `resources`.
    pub routes_dir: Option<String>,

    /// Resource routes, matched in order before the strict route.
    pub resources: Vec<ResourceRouteConfig>,
}

/// A single resource route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceRouteConfig {
    /// Route mask (e.g., "api/items[/<id>]").
    pub mask: String,

    /// Presenter handling matched requests.
    pub presenter: String,

    /// HTTP method name → action name.
    #[serde(default)]
    pub actions: BTreeMap<String, String>,
}

/// Content negotiation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Content type used when the client accepts anything.
    pub default_content_type: String,

    /// Pretty-print mapped output.
    pub pretty_print: bool,

    /// Query parameter selecting a JSONP response and naming its callback.
    pub jsonp_param: String,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            default_content_type: resource::JSON.to_string(),
            pretty_print: false,
            jsonp_param: "jsonp".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,

    /// Grace period for in-flight requests on shutdown, in seconds.
    pub shutdown_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.negotiation.default_content_type, "application/json");
        assert!(config.routing.resources.is_empty());
    }

    #[test]
    fn test_resource_routes() {
        let config: AppConfig = toml::from_str(
            r#"
            [routing]
            strict_prefix = "api"

            [[routing.resources]]
            mask = "items/<id>"
            presenter = "Items"
            actions = { GET = "read", PATCH = "update" }
            "#,
        )
        .unwrap();

        assert_eq!(config.routing.strict_prefix.as_deref(), Some("api"));
        let route = &config.routing.resources[0];
        assert_eq!(route.actions.get("PATCH").map(String::as_str), Some("update"));
    }
}
