//! Router tree.
//!
//! A tree node is either a resource router, a plain router, or an ordered
//! list of nodes. Lists match first-wins in insertion order.

use std::sync::Arc;

use url::Url;

use crate::error::RestResult;
use crate::http::request::HttpRequest;
use crate::routing::router::{AppRequest, ResourceRouter, Router};

#[derive(Debug, Clone)]
pub enum RouterNode {
    Resource(Arc<dyn ResourceRouter>),
    Route(Arc<dyn Router>),
    List(RouteList),
}

impl RouterNode {
    pub fn match_request(&self, request: &HttpRequest) -> RestResult<Option<AppRequest>> {
        match self {
            RouterNode::Resource(route) => route.match_request(request),
            RouterNode::Route(route) => route.match_request(request),
            RouterNode::List(list) => list.match_request(request),
        }
    }

    pub fn construct_url(&self, request: &AppRequest, base: &Url) -> Option<String> {
        match self {
            RouterNode::Resource(route) => route.construct_url(request, base),
            RouterNode::Route(route) => route.construct_url(request, base),
            RouterNode::List(list) => list.construct_url(request, base),
        }
    }
}

/// Ordered collection of routers, optionally scoped to a module.
#[derive(Debug, Clone, Default)]
pub struct RouteList {
    module: Option<String>,
    routes: Vec<RouterNode>,
}

impl RouteList {
    pub fn new() -> Self {
        Self::default()
    }

    /// List whose matches are assigned to `module`.
    pub fn with_module(module: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            routes: Vec::new(),
        }
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn push(&mut self, node: RouterNode) -> &mut Self {
        self.routes.push(node);
        self
    }

    pub fn add_resource(&mut self, route: Arc<dyn ResourceRouter>) -> &mut Self {
        self.push(RouterNode::Resource(route))
    }

    pub fn add_route(&mut self, route: Arc<dyn Router>) -> &mut Self {
        self.push(RouterNode::Route(route))
    }

    pub fn add_list(&mut self, list: RouteList) -> &mut Self {
        self.push(RouterNode::List(list))
    }

    pub fn nodes(&self) -> &[RouterNode] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// First match in insertion order. The list's module is applied to
    /// matches that do not carry one.
    pub fn match_request(&self, request: &HttpRequest) -> RestResult<Option<AppRequest>> {
        for node in &self.routes {
            if let Some(mut app_request) = node.match_request(request)? {
                if app_request.module.is_none() {
                    app_request.module = self.module.clone();
                }
                return Ok(Some(app_request));
            }
        }
        Ok(None)
    }

    pub fn construct_url(&self, request: &AppRequest, base: &Url) -> Option<String> {
        self.routes
            .iter()
            .find_map(|node| node.construct_url(request, base))
    }
}
