//! Content negotiation: choose a response kind and mapper for a request.
//!
//! # Data Flow
//! ```text
//! HttpRequest (Accept, ?jsonp=)
//!     → negotiate (first acceptable registered type, or default)
//!     → MapperContext::get_mapper
//!     → TextResponse / JsonpResponse
//! ```
//!
//! # Design Decisions
//! - `q` parameters only matter when they are zero (type refused)
//! - Accept order decides; registration order breaks wildcard ties
//! - Unresolvable types are `InvalidState`; the pipeline turns that into 415

use std::sync::Arc;

use crate::config::schema::NegotiationConfig;
use crate::error::{RestError, RestResult};
use crate::http::request::HttpRequest;
use crate::http::response::{ApiResponse, JsonpResponse, TextResponse};
use crate::mapping::context::normalize;
use crate::mapping::MapperContext;
use crate::resource::{self, Resource};

/// How a negotiated content type is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Mapper output as the body.
    Text,
    /// Mapper output wrapped in a JSONP callback; uses the JSON mapper.
    Jsonp,
}

#[derive(Debug, Clone)]
pub struct ResponseFactory {
    mappers: Arc<MapperContext>,
    responses: Vec<(String, ResponseKind)>,
    default_content_type: String,
    pretty_print: bool,
    jsonp_param: String,
}

impl ResponseFactory {
    /// Factory answering JSON, JSONP and query-string requests.
    pub fn new(mappers: Arc<MapperContext>, config: &NegotiationConfig) -> Self {
        let mut factory = Self {
            mappers,
            responses: Vec::new(),
            default_content_type: normalize(&config.default_content_type),
            pretty_print: config.pretty_print,
            jsonp_param: config.jsonp_param.clone(),
        };
        factory
            .register(resource::JSON, ResponseKind::Text)
            .register(resource::JSONP, ResponseKind::Jsonp)
            .register(resource::QUERY, ResponseKind::Text);
        factory
    }

    /// Register (or replace) the response kind for `content_type`.
    pub fn register(&mut self, content_type: &str, kind: ResponseKind) -> &mut Self {
        let content_type = normalize(content_type);
        match self.responses.iter_mut().find(|(ct, _)| *ct == content_type) {
            Some(entry) => entry.1 = kind,
            None => self.responses.push((content_type, kind)),
        }
        self
    }

    pub fn default_content_type(&self) -> &str {
        &self.default_content_type
    }

    /// True when `accept` names at least one type this factory can send.
    pub fn is_acceptable(&self, accept: &str) -> bool {
        self.from_accept(accept).is_some()
    }

    /// Content type to answer `request` with, `None` when nothing acceptable
    /// is registered.
    pub fn negotiate(&self, request: &HttpRequest) -> Option<String> {
        if request.query_param(&self.jsonp_param).is_some() && self.kind(resource::JSONP).is_some() {
            return Some(resource::JSONP.to_string());
        }
        match request.header("accept") {
            Some(accept) if !accept.trim().is_empty() => self.from_accept(accept),
            _ => Some(self.default_content_type.clone()),
        }
    }

    /// Response rendering `payload` for `request`. A `forced` content type
    /// bypasses negotiation.
    pub fn create(
        &self,
        request: &HttpRequest,
        payload: &Resource,
        forced: Option<&str>,
    ) -> RestResult<Box<dyn ApiResponse>> {
        let content_type = match forced {
            Some(forced) => normalize(forced),
            None => self.negotiate(request).ok_or_else(|| {
                RestError::InvalidState(format!(
                    "Unregistered API response for {}",
                    request.header("accept").unwrap_or_default()
                ))
            })?,
        };

        let kind = self.kind(&content_type).ok_or_else(|| {
            RestError::InvalidState(format!("Unregistered API response for {content_type}"))
        })?;

        let data = payload.to_value();
        let response: Box<dyn ApiResponse> = match kind {
            ResponseKind::Text => {
                let mapper = self.mappers.get_mapper(&content_type)?;
                Box::new(
                    TextResponse::new(data, mapper, Some(&content_type))
                        .pretty_print(self.pretty_print),
                )
            }
            ResponseKind::Jsonp => {
                let mapper = self.mappers.get_mapper(resource::JSON)?;
                Box::new(
                    JsonpResponse::new(data, mapper, Some(&content_type))
                        .callback_param(self.jsonp_param.clone())
                        .pretty_print(self.pretty_print),
                )
            }
        };
        Ok(response)
    }

    fn kind(&self, content_type: &str) -> Option<ResponseKind> {
        self.responses
            .iter()
            .find(|(ct, _)| ct == content_type)
            .map(|(_, kind)| *kind)
    }

    fn from_accept(&self, accept: &str) -> Option<String> {
        for entry in accept.split(',') {
            let mut parts = entry.split(';');
            let mime = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
            if mime.is_empty() || parts.any(refuses) {
                continue;
            }

            if mime == "*/*" {
                if self.kind(&self.default_content_type).is_some() {
                    return Some(self.default_content_type.clone());
                }
                if let Some((ct, _)) = self.responses.first() {
                    return Some(ct.clone());
                }
                continue;
            }
            if let Some(main) = mime.strip_suffix("/*") {
                let prefix = format!("{main}/");
                if let Some((ct, _)) = self.responses.iter().find(|(ct, _)| ct.starts_with(&prefix)) {
                    return Some(ct.clone());
                }
                continue;
            }
            if self.kind(&mime).is_some() {
                return Some(mime);
            }
        }
        None
    }
}

/// `q=0` parameter.
fn refuses(param: &str) -> bool {
    match param.trim().split_once('=') {
        Some((name, value)) if name.trim().eq_ignore_ascii_case("q") => {
            value.trim().parse::<f32>().map_or(false, |q| q <= 0.0)
        }
        _ => false,
    }
}
