//! Request pipeline: route, read input, validate, handle, render.
//!
//! # Data Flow
//! ```text
//! HttpRequest
//!     → OPTIONS? MethodOptions → 204 + Allow
//!     → RouteList::match_request        (no match → 404)
//!     → MapperContext (Content-Type)    (body → mapping, failure → 415)
//!     → ResourcePresenter::validate     (failing rules → 422)
//!     → ResourcePresenter::handle       → Resource
//!     → ResponseFactory (Accept)        (unacceptable → 415)
//!     → RouteList::construct_url        (Link: rel="self" when reversible)
//!     → HttpResponse
//!
//! Any RestError
//!     → Resource::from_error → ErrorResponse (JSON when Accept cannot be met)
//! ```
//!
//! # Design Decisions
//! - Synchronous: the pipeline never blocks on I/O, the host adapter owns it
//! - Every error becomes a coded response rendered like a success
//! - The route list is fetched per request so a reloaded list is picked up;
//!   factory error details are logged, never sent to the client

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use crate::application::negotiation::ResponseFactory;
use crate::application::presenter::PresenterRegistry;
use crate::error::{RestError, RestResult};
use crate::http::request::{HttpRequest, RequestIdExt};
use crate::http::response::{ApiResponse, ErrorResponse, HttpResponse};
use crate::mapping::MapperContext;
use crate::observability::metrics;
use crate::resource::{self, Resource};
use crate::routing::factory::RouteListFactory;
use crate::routing::method::Method;
use crate::routing::node::RouteList;
use crate::routing::options::MethodOptions;
use crate::routing::router::AppRequest;
use crate::validation::{Input, ValidationScopeFactory};

pub struct RestPipeline {
    routes: Arc<dyn RouteListFactory>,
    module: Option<String>,
    mappers: Arc<MapperContext>,
    responses: ResponseFactory,
    presenters: PresenterRegistry,
    scopes: Arc<dyn ValidationScopeFactory>,
}

impl RestPipeline {
    pub fn new(
        routes: Arc<dyn RouteListFactory>,
        mappers: Arc<MapperContext>,
        responses: ResponseFactory,
        presenters: PresenterRegistry,
        scopes: Arc<dyn ValidationScopeFactory>,
    ) -> Self {
        Self {
            routes,
            module: None,
            mappers,
            responses,
            presenters,
            scopes,
        }
    }

    /// Module requested from the route list factory.
    pub fn with_module(mut self, module: Option<String>) -> Self {
        self.module = module;
        self
    }

    pub fn responses(&self) -> &ResponseFactory {
        &self.responses
    }

    /// Process `request` to completion. Never fails: errors are rendered.
    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let start = Instant::now();
        let response = match self.process(request) {
            Ok(response) => response,
            Err(error) => self.error_response(request, &error),
        };

        tracing::debug!(
            request_id = request.request_id().unwrap_or("-"),
            method = request.method(),
            path = request.path(),
            status = response.code(),
            "Request handled"
        );
        metrics::record_request(request.method(), response.code(), start);
        response
    }

    /// Method names accepted at the request URL.
    pub fn options(&self, request: &HttpRequest) -> RestResult<Vec<String>> {
        let routes = self.route_list()?;
        Ok(MethodOptions::new(RouteList::clone(&routes)).get_options(request.url()))
    }

    fn route_list(&self) -> RestResult<Arc<RouteList>> {
        self.routes.create(self.module.as_deref()).map_err(|e| {
            tracing::error!(error = %e, "Route list unavailable");
            RestError::InvalidState("Route list unavailable".to_string())
        })
    }

    fn process(&self, request: &HttpRequest) -> RestResult<HttpResponse> {
        let routes = self.route_list()?;

        if Method::from_name(request.method()) == Some(Method::Options) {
            let methods = MethodOptions::new(RouteList::clone(&routes)).get_options(request.url());
            if !methods.is_empty() {
                let mut response = HttpResponse::new();
                response.set_code(204).set_header("allow", &methods.join(", "));
                return Ok(response);
            }
        }

        let app_request = routes.match_request(request)?.ok_or_else(|| {
            RestError::not_found(format!(
                "No route for {} {}",
                request.method(),
                request.path()
            ))
        })?;
        let presenter = self.presenters.get(&app_request)?;

        let mut input = Input::new(self.read_input(request)?, self.scopes.create());
        presenter.validate(&app_request, &mut input);
        self.check_input(&app_request, &input)?;

        let resource = presenter.handle(&app_request, &input)?;
        let mut response = self.render(request, &resource)?;
        if let Some(link) = routes.construct_url(&app_request, request.url()) {
            response.set_header("link", &format!("<{link}>; rel=\"self\""));
        }
        Ok(response)
    }

    /// Query, then parsed body, then form data; later sources win.
    fn read_input(&self, request: &HttpRequest) -> RestResult<Map<String, Value>> {
        let mut data = request.query().clone();

        if !request.body().trim().is_empty() {
            let content_type = request.header("content-type").unwrap_or_default();
            let body = self
                .mappers
                .get_mapper(content_type)
                .and_then(|mapper| mapper.parse(request.body()).map_err(RestError::from))
                .map_err(|e| RestError::unsupported_media_type(e.to_string()))?;
            data.extend(body);
        }

        data.extend(request.post().clone());
        Ok(data)
    }

    fn check_input(&self, app_request: &AppRequest, input: &Input) -> RestResult<()> {
        let errors = input.validate()?;
        let Some(first) = errors.first() else {
            return Ok(());
        };

        let message = format!("Validation Failed: {}", first.message());
        tracing::info!(
            presenter = %app_request.presenter_name(),
            action = %app_request.action,
            errors = errors.len(),
            "Input rejected"
        );
        metrics::record_validation_failure(&app_request.presenter_name());
        Err(RestError::unprocessable_entity(errors, message))
    }

    fn render(&self, request: &HttpRequest, resource: &Resource) -> RestResult<HttpResponse> {
        let mut response = HttpResponse::new();
        self.responses
            .create(request, resource, None)
            .and_then(|api_response| api_response.send(request, &mut response))
            .map_err(|e| match e {
                RestError::InvalidState(message) => RestError::unsupported_media_type(message),
                other => other,
            })?;
        Ok(response)
    }

    /// Render `error` as an error resource for `request`.
    pub fn error_response(&self, request: &HttpRequest, error: &RestError) -> HttpResponse {
        let status = error.status();
        if status >= 500 {
            tracing::error!(error = %error, path = request.path(), "Request failed");
        } else {
            tracing::debug!(error = %error, status, path = request.path(), "Request rejected");
        }
        metrics::record_error(status);

        let resource = Resource::from_error(error);
        let forced = self.error_content_type(request);
        let rendered = self
            .responses
            .create(request, &resource, forced)
            .and_then(|inner| {
                let mut response = HttpResponse::new();
                ErrorResponse::for_error(inner, error).send(request, &mut response)?;
                Ok(response)
            });

        match rendered {
            Ok(response) => response,
            Err(render_error) => {
                tracing::error!(error = %render_error, "Failed to render error resource");
                let mut response = HttpResponse::new();
                response
                    .set_code(status)
                    .set_content_type(resource::TEXT)
                    .write(&error.to_string());
                response
            }
        }
    }

    /// JSON unless the client asked for something this factory can send.
    fn error_content_type(&self, request: &HttpRequest) -> Option<&'static str> {
        match self.responses.negotiate(request) {
            Some(_) if request.header("accept").is_some_and(|a| !a.trim().is_empty()) => None,
            Some(negotiated) if negotiated == resource::JSONP => None,
            _ => Some(resource::JSON),
        }
    }
}

impl std::fmt::Debug for RestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestPipeline")
            .field("module", &self.module)
            .field("responses", &self.responses)
            .field("presenters", &self.presenters)
            .finish_non_exhaustive()
    }
}
