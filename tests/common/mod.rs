//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::net::TcpListener;

use restful_api::application::{
    EchoPresenter, PresenterRegistry, ResourcePresenter, RestPipeline,
};
use restful_api::config::{parse_config, AppConfig};
use restful_api::error::{RestError, RestResult};
use restful_api::http::HttpServer;
use restful_api::lifecycle::{build_pipeline, Shutdown};
use restful_api::resource::Resource;
use restful_api::routing::AppRequest;
use restful_api::validation::{rule, Input, RuleKind};

/// Route configuration shared by the integration tests.
pub const CONFIG: &str = r#"
[routing]
strict_prefix = "api"

[[routing.resources]]
mask = "users[/<id \\d+>]"
presenter = "Users"
actions = { GET = "read", POST = "create", PUT = "update", DELETE = "delete" }
"#;

/// In-memory user store keyed by id.
pub struct Users;

impl ResourcePresenter for Users {
    fn validate(&self, request: &AppRequest, input: &mut Input) {
        if request.action == "create" || request.action == "update" {
            input
                .field("email")
                .add_rule(RuleKind::Required, "Email is required")
                .add_rule(RuleKind::Email, "Please fill a valid email");
            input
                .field("age")
                .add_rule_with(rule::RANGE, "Age out of range", vec![json!(18), json!(99)], 0);
        }
    }

    fn handle(&self, request: &AppRequest, input: &Input) -> RestResult<Resource> {
        let mut resource = Resource::new();
        match (request.action.as_str(), request.param("id")) {
            ("read", Some(id)) if id == &json!("404") => {
                return Err(RestError::not_found("User not found"));
            }
            ("read", Some(id)) => {
                resource.set("id", id.clone());
                resource.set("name", "John");
            }
            ("read", None) => {
                resource.set("users", json!([{"id": 1}, {"id": 2}]));
            }
            ("create", _) | ("update", _) => {
                resource.set("email", input.get("email").cloned().unwrap_or_default());
            }
            (action, _) => resource.set("action", action),
        }
        Ok(resource)
    }
}

pub fn config() -> AppConfig {
    parse_config(CONFIG).unwrap()
}

pub fn presenters() -> PresenterRegistry {
    let mut presenters = PresenterRegistry::new();
    presenters.register("Users", Arc::new(Users));
    presenters.with_fallback(Arc::new(EchoPresenter))
}

pub fn pipeline() -> RestPipeline {
    build_pipeline(&config(), presenters()).unwrap()
}

/// Serve `config` on an ephemeral port until the returned handle is triggered.
pub async fn start_server(config: AppConfig) -> (SocketAddr, Shutdown) {
    let pipeline = Arc::new(build_pipeline(&config, presenters()).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, pipeline);
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
