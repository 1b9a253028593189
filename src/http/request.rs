//! Request capability consumed by routers and the pipeline.
//!
//! # Responsibilities
//! - Carry method, absolute URL, headers, query, body and file payload
//! - Generate and propagate a unique request ID (UUID v4)
//!
//! # Design Decisions
//! - Query data is decoded once, at construction
//! - Request ID added as early as possible for tracing

use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use serde_json::{Map, Value};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use url::Url;
use uuid::Uuid;

use crate::mapping::query::parse_query;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Header overriding the request method for resource routes.
pub const X_HTTP_METHOD_OVERRIDE: &str = "x-http-method-override";

/// Query parameter overriding the request method for resource routes.
pub const METHOD_OVERRIDE_PARAM: &str = "__method";

#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: String,
    url: Url,
    headers: HeaderMap,
    query: Map<String, Value>,
    post: Map<String, Value>,
    body: String,
    files: Vec<String>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        let query = url.query().map(parse_query).unwrap_or_default();
        Self {
            method: method.into(),
            url,
            headers: HeaderMap::new(),
            query,
            post: Map::new(),
            body: String::new(),
            files: Vec::new(),
        }
    }

    /// Add a header. Invalid names or values are dropped with a warning.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid request header"),
        }
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_post(mut self, post: Map<String, Value>) -> Self {
        self.post = post;
        self
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of header `name`, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query(&self) -> &Map<String, Value> {
        &self.query
    }

    /// Query parameter `name` when it is a plain string.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).and_then(Value::as_str)
    }

    pub fn post(&self) -> &Map<String, Value> {
        &self.post
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }
}

/// Makes `x-request-id` values from random UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Layer setting `x-request-id` on requests that do not carry one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer copying `x-request-id` from the request onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Access to the request ID of a request.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl RequestIdExt for HttpRequest {
    fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&str> {
        self.headers().get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_is_decoded() {
        let url = Url::parse("http://localhost/api/users?page=2&filter[name]=john").unwrap();
        let request = HttpRequest::new("GET", url);

        assert_eq!(request.path(), "/api/users");
        assert_eq!(request.query_param("page"), Some("2"));
        assert_eq!(request.query().get("filter"), Some(&json!({"name": "john"})));
    }

    #[test]
    fn test_headers() {
        let url = Url::parse("http://localhost/").unwrap();
        let request = HttpRequest::new("GET", url)
            .with_header("Accept", "application/json")
            .with_header("X-Request-Id", "abc")
            .with_header("Bad Header", "x");

        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.request_id(), Some("abc"));
        assert_eq!(request.headers().len(), 2);
    }

    #[test]
    fn test_make_request_uuid() {
        let mut make = MakeRequestUuid;
        let request = Request::builder().body(()).unwrap();
        let id = make.make_request_id(&request).expect("request id");
        let id = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }
}
