//! Router capabilities and the application request they produce.
//!
//! # Responsibilities
//! - Translate an [`HttpRequest`] into an [`AppRequest`] or explicit no-match
//! - Declare, for resource routers, which methods they answer and the
//!   action each method maps to
//!
//! # Design Decisions
//! - Routers are immutable after construction (shared via `Arc` without locks)
//! - A no-match is `Ok(None)`; `Err` is reserved for malformed input

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use url::Url;

use crate::error::RestResult;
use crate::http::request::HttpRequest;
use crate::routing::method::Method;

/// Routed request handed to the application layer.
#[derive(Debug, Clone, PartialEq)]
pub struct AppRequest {
    pub module: Option<String>,
    pub presenter: String,
    pub action: String,
    /// Original HTTP method of the request.
    pub method: String,
    pub params: Map<String, Value>,
    pub post: Map<String, Value>,
    pub files: Vec<String>,
}

impl AppRequest {
    pub fn new(presenter: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: None,
            presenter: presenter.into(),
            action: action.into(),
            method: Method::Get.as_str().to_string(),
            params: Map::new(),
            post: Map::new(),
            files: Vec::new(),
        }
    }

    /// `Module:Presenter` when a module is set, otherwise the presenter.
    pub fn presenter_name(&self) -> String {
        match self.module.as_deref() {
            Some(module) if !module.is_empty() => format!("{module}:{}", self.presenter),
            _ => self.presenter.clone(),
        }
    }

    /// Positional path parameters, as emitted by strict routes.
    pub fn path_params(&self) -> Vec<String> {
        match self.params.get("params") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

/// Two-way translation between HTTP requests and application requests.
pub trait Router: Send + Sync + fmt::Debug {
    /// Match `request`. `Ok(None)` when this router does not apply.
    fn match_request(&self, request: &HttpRequest) -> RestResult<Option<AppRequest>>;

    /// Absolute URL for `request` relative to `base`, when this router can
    /// build one.
    fn construct_url(&self, request: &AppRequest, base: &Url) -> Option<String>;
}

/// Router that declares the methods it answers and their actions.
pub trait ResourceRouter: Router {
    fn is_method(&self, method: Method) -> bool;

    /// Method `request` resolves to for this router, overrides included.
    fn get_method(&self, request: &HttpRequest) -> Option<Method>;

    /// Method → action name, for every method the router supports.
    fn action_dictionary(&self) -> &BTreeMap<Method, String>;
}
