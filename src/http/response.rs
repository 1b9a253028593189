//! API responses and the buffered response sink they write into.
//!
//! # Responsibilities
//! - Serialize a resource through a mapper (text responses)
//! - Wrap serialized output in a JSONP callback
//! - Override the status code for error responses
//! - Convert the finished sink into an axum response
//!
//! # Design Decisions
//! - Responses write into an [`HttpResponse`] rather than a socket so the
//!   pipeline stays synchronous and testable
//! - A response only sets the content type and body; the status code is
//!   owned by the caller unless the response is an [`ErrorResponse`]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};

use crate::error::{RestError, RestResult};
use crate::http::request::HttpRequest;
use crate::mapping::Mapper;
use crate::resource;

/// Buffered response: status code, headers and body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    code: u16,
    headers: HeaderMap,
    body: String,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self {
            code: 200,
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }
}

impl HttpResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn set_code(&mut self, code: u16) -> &mut Self {
        self.code = code;
        self
    }

    /// Set `Content-Type` to `content_type; charset=utf-8`.
    pub fn set_content_type(&mut self, content_type: &str) -> &mut Self {
        self.set_header(header::CONTENT_TYPE.as_str(), &format!("{content_type}; charset=utf-8"))
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// Replace header `name`. Invalid names or values are dropped with a warning.
    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Append to the body.
    pub fn write(&mut self, chunk: &str) -> &mut Self {
        self.body.push_str(chunk);
        self
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Headers as a `name → value` mapping.
    pub fn headers_map(&self) -> Map<String, Value> {
        self.headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
            })
            .collect()
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// A response that renders itself into an [`HttpResponse`].
pub trait ApiResponse: Send + Sync + std::fmt::Debug {
    fn content_type(&self) -> &str;

    fn send(&self, request: &HttpRequest, response: &mut HttpResponse) -> RestResult<()>;
}

/// Payload serialized by a mapper.
#[derive(Debug, Clone)]
pub struct TextResponse {
    data: Value,
    mapper: Arc<dyn Mapper>,
    content_type: String,
    pretty_print: bool,
}

impl TextResponse {
    /// `content_type` of `None` sends `text/plain`.
    pub fn new(data: Value, mapper: Arc<dyn Mapper>, content_type: Option<&str>) -> Self {
        Self {
            data,
            mapper,
            content_type: content_type.unwrap_or(resource::TEXT).to_string(),
            pretty_print: false,
        }
    }

    pub fn pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

impl ApiResponse for TextResponse {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn send(&self, _request: &HttpRequest, response: &mut HttpResponse) -> RestResult<()> {
        let body = self.mapper.stringify(&self.data, self.pretty_print)?;
        response.set_content_type(&self.content_type).write(&body);
        Ok(())
    }
}

/// `<callback>({"response":…,"status":…,"headers":…});`
#[derive(Debug, Clone)]
pub struct JsonpResponse {
    data: Value,
    mapper: Arc<dyn Mapper>,
    content_type: String,
    callback_param: String,
    pretty_print: bool,
}

impl JsonpResponse {
    /// `content_type` of `None` sends `application/javascript`.
    pub fn new(data: Value, mapper: Arc<dyn Mapper>, content_type: Option<&str>) -> Self {
        Self {
            data,
            mapper,
            content_type: content_type.unwrap_or(resource::JSONP).to_string(),
            callback_param: "jsonp".to_string(),
            pretty_print: false,
        }
    }

    /// Query parameter naming the callback.
    pub fn callback_param(mut self, name: impl Into<String>) -> Self {
        self.callback_param = name.into();
        self
    }

    pub fn pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }
}

impl ApiResponse for JsonpResponse {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn send(&self, request: &HttpRequest, response: &mut HttpResponse) -> RestResult<()> {
        response.set_content_type(&self.content_type);

        let mut envelope = Map::new();
        envelope.insert("response".into(), self.data.clone());
        envelope.insert("status".into(), Value::from(response.code()));
        envelope.insert("headers".into(), Value::Object(response.headers_map()));

        let callback = request
            .query_param(&self.callback_param)
            .map(webalize)
            .unwrap_or_default();
        let body = self
            .mapper
            .stringify(&Value::Object(envelope), self.pretty_print)?;
        response.write(&format!("{callback}({body});"));
        Ok(())
    }
}

/// Wraps a response and sends it with an error status code.
#[derive(Debug)]
pub struct ErrorResponse {
    inner: Box<dyn ApiResponse>,
    code: u16,
}

impl ErrorResponse {
    pub fn new(inner: Box<dyn ApiResponse>, code: u16) -> Self {
        Self { inner, code }
    }

    /// Wrap `inner` with the status of `error`.
    pub fn for_error(inner: Box<dyn ApiResponse>, error: &RestError) -> Self {
        Self::new(inner, error.status())
    }

    pub fn code(&self) -> u16 {
        self.code
    }
}

impl ApiResponse for ErrorResponse {
    fn content_type(&self) -> &str {
        self.inner.content_type()
    }

    fn send(&self, request: &HttpRequest, response: &mut HttpResponse) -> RestResult<()> {
        response.set_code(self.code);
        self.inner.send(request, response)
    }
}

/// Transliterate to ASCII, keep letters and digits, collapse every other
/// run into `-` and trim dashes from both ends. Case is preserved.
pub fn webalize(raw: &str) -> String {
    let ascii = deunicode::deunicode(raw);
    let mut out = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{JsonMapper, NullMapper};
    use serde_json::json;
    use url::Url;

    fn request(query: &str) -> HttpRequest {
        HttpRequest::new("GET", Url::parse(&format!("http://localhost/api{query}")).unwrap())
    }

    #[test]
    fn test_text_response() {
        let response = TextResponse::new(json!({"a": 1}), Arc::new(JsonMapper), Some(resource::JSON));
        let mut sink = HttpResponse::new();
        response.send(&request(""), &mut sink).unwrap();

        assert_eq!(sink.code(), 200);
        assert_eq!(sink.content_type(), Some("application/json; charset=utf-8"));
        assert_eq!(sink.body(), r#"{"a":1}"#);
    }

    #[test]
    fn test_text_response_defaults_to_plain_text() {
        let response = TextResponse::new(json!("hello"), Arc::new(NullMapper), None);
        assert_eq!(response.content_type(), "text/plain");

        let mut sink = HttpResponse::new();
        response.send(&request(""), &mut sink).unwrap();
        assert_eq!(sink.body(), "hello");
    }

    #[test]
    fn test_jsonp_response() {
        let response = JsonpResponse::new(json!({"id": 1}), Arc::new(JsonMapper), None);
        let mut sink = HttpResponse::new();
        response.send(&request("?jsonp=my.Callback"), &mut sink).unwrap();

        assert_eq!(
            sink.body(),
            r#"my-Callback({"response":{"id":1},"status":200,"headers":{"content-type":"application/javascript; charset=utf-8"}});"#
        );
    }

    #[test]
    fn test_jsonp_without_callback() {
        let response = JsonpResponse::new(json!([]), Arc::new(JsonMapper), None);
        let mut sink = HttpResponse::new();
        response.send(&request(""), &mut sink).unwrap();
        assert!(sink.body().starts_with("({\"response\":[]"));
        assert!(sink.body().ends_with("});"));
    }

    #[test]
    fn test_error_response_sets_code() {
        let inner = TextResponse::new(json!({"code": 404}), Arc::new(JsonMapper), Some(resource::JSON));
        let response = ErrorResponse::for_error(Box::new(inner), &RestError::not_found("missing"));
        let mut sink = HttpResponse::new();
        response.send(&request(""), &mut sink).unwrap();

        assert_eq!(sink.code(), 404);
        assert_eq!(response.content_type(), "application/json");
    }

    #[test]
    fn test_webalize() {
        assert_eq!(webalize("jQuery_123"), "jQuery-123");
        assert_eq!(webalize("  <script>alert(1)</script> "), "script-alert-1-script");
        assert_eq!(webalize("---"), "");
    }

    #[test]
    fn test_webalize_transliterates() {
        assert_eq!(webalize("čau"), "cau");
        assert_eq!(webalize("Žluťoučký kůň"), "Zlutoucky-kun");
    }

    #[test]
    fn test_into_response() {
        let mut sink = HttpResponse::new();
        sink.set_code(422).set_content_type(resource::JSON).write("{}");
        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );
    }
}
