//! Resource route: a route mask bound to a presenter and an action per
//! HTTP method.

use std::collections::BTreeMap;

use serde_json::Value;
use url::Url;

use crate::error::RestResult;
use crate::http::request::{HttpRequest, METHOD_OVERRIDE_PARAM, X_HTTP_METHOD_OVERRIDE};
use crate::routing::matcher::Mask;
use crate::routing::method::{Method, MethodMask};
use crate::routing::router::{AppRequest, ResourceRouter, Router};

#[derive(Debug, Clone)]
pub struct ResourceRoute {
    mask: Mask,
    presenter: String,
    methods: MethodMask,
    actions: BTreeMap<Method, String>,
}

impl ResourceRoute {
    pub fn new(mask: &str, presenter: impl Into<String>) -> RestResult<Self> {
        Ok(Self {
            mask: Mask::parse(mask)?,
            presenter: presenter.into(),
            methods: MethodMask::NONE,
            actions: BTreeMap::new(),
        })
    }

    /// Map `method` to `action`.
    pub fn action(mut self, method: Method, action: impl Into<String>) -> Self {
        self.methods = self.methods.with(method);
        self.actions.insert(method, action.into());
        self
    }

    /// Route with the conventional CRUD actions
    /// (`read`, `create`, `update`, `delete`, `patch`).
    pub fn crud(mask: &str, presenter: impl Into<String>) -> RestResult<Self> {
        Ok(Self::new(mask, presenter)?
            .action(Method::Get, "read")
            .action(Method::Post, "create")
            .action(Method::Put, "update")
            .action(Method::Delete, "delete")
            .action(Method::Patch, "patch"))
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn presenter(&self) -> &str {
        &self.presenter
    }

    pub fn methods(&self) -> MethodMask {
        self.methods
    }
}

impl Router for ResourceRoute {
    fn match_request(&self, request: &HttpRequest) -> RestResult<Option<AppRequest>> {
        let Some(method) = self.get_method(request) else {
            return Ok(None);
        };
        let Some(action) = self.actions.get(&method) else {
            return Ok(None);
        };
        let Some(captured) = self.mask.matches(request.path()) else {
            return Ok(None);
        };

        let mut app_request = AppRequest::new(self.presenter.clone(), action.clone());
        app_request.method = request.method().to_string();
        app_request.params = request.query().clone();
        for (name, value) in captured {
            app_request.params.insert(name, Value::String(value));
        }
        app_request.post = request.post().clone();
        app_request.files = request.files().to_vec();

        tracing::trace!(
            mask = self.mask.as_str(),
            presenter = %self.presenter,
            action = %action,
            "Resource route matched"
        );
        Ok(Some(app_request))
    }

    fn construct_url(&self, request: &AppRequest, base: &Url) -> Option<String> {
        if request.presenter != self.presenter || !self.actions.values().any(|a| *a == request.action) {
            return None;
        }

        let params = self
            .mask
            .names()
            .iter()
            .filter_map(|name| {
                let value = match request.params.get(name)? {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => return None,
                };
                Some((name.clone(), value))
            })
            .collect();

        let path = self.mask.build(&params)?;
        base.join(&path).ok().map(String::from)
    }
}

impl ResourceRouter for ResourceRoute {
    fn is_method(&self, method: Method) -> bool {
        self.methods.contains(method)
    }

    /// Request method, overridden by the `X-HTTP-Method-Override` header or
    /// the `__method` query parameter.
    fn get_method(&self, request: &HttpRequest) -> Option<Method> {
        let name = request
            .header(X_HTTP_METHOD_OVERRIDE)
            .or_else(|| request.query_param(METHOD_OVERRIDE_PARAM))
            .unwrap_or(request.method());
        Method::from_name(name)
    }

    fn action_dictionary(&self) -> &BTreeMap<Method, String> {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(method: &str, path: &str) -> HttpRequest {
        HttpRequest::new(method, Url::parse(&format!("http://localhost{path}")).unwrap())
    }

    #[test]
    fn test_match_by_method() {
        let route = ResourceRoute::new("api/items/<id>", "Items")
            .unwrap()
            .action(Method::Get, "read")
            .action(Method::Patch, "update");

        let matched = route.match_request(&request("GET", "/api/items/1?x=y")).unwrap().unwrap();
        assert_eq!(matched.action, "read");
        assert_eq!(matched.param("id"), Some(&json!("1")));
        assert_eq!(matched.param("x"), Some(&json!("y")));

        assert!(route.match_request(&request("POST", "/api/items/1")).unwrap().is_none());
        assert!(route.match_request(&request("GET", "/api/other/1")).unwrap().is_none());
    }

    #[test]
    fn test_method_override() {
        let route = ResourceRoute::crud("api/items/<id>", "Items").unwrap();

        let header = request("POST", "/api/items/1").with_header("X-HTTP-Method-Override", "DELETE");
        assert_eq!(route.get_method(&header), Some(Method::Delete));
        assert_eq!(route.match_request(&header).unwrap().unwrap().action, "delete");

        let query = request("POST", "/api/items/1?__method=PUT");
        assert_eq!(route.match_request(&query).unwrap().unwrap().action, "update");
    }

    #[test]
    fn test_action_dictionary_and_flags() {
        let route = ResourceRoute::crud("api/items", "Items").unwrap();
        assert_eq!(route.methods(), MethodMask::CRUD);
        assert!(route.is_method(Method::Put));
        assert!(!route.is_method(Method::Head));
        assert_eq!(
            route.action_dictionary().get(&Method::Patch).map(String::as_str),
            Some("patch")
        );
    }

    #[test]
    fn test_construct_url() {
        let route = ResourceRoute::crud("api/items[/<id>]", "Items").unwrap();
        let base = Url::parse("http://example.com/").unwrap();

        let mut app_request = AppRequest::new("Items", "read");
        app_request.params.insert("id".into(), json!(5));
        assert_eq!(
            route.construct_url(&app_request, &base),
            Some("http://example.com/api/items/5".to_string())
        );

        let other = AppRequest::new("Users", "read");
        assert_eq!(route.construct_url(&other, &base), None);
    }
}
