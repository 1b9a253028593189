//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the API handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Convert axum requests into pipeline requests and back: URL-encoded
//!   and multipart bodies also fill the form data, multipart uploads the
//!   file list
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, FromRequest, Multipart, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use serde_json::{Map, Value};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

use crate::application::RestPipeline;
use crate::config::AppConfig;
use crate::error::RestError;
use crate::http::request::{
    propagate_request_id_layer, set_request_id_layer, HttpRequest, RequestIdExt,
};
use crate::http::response::HttpResponse;
use crate::lifecycle::Shutdown;
use crate::mapping::{context::normalize, query::parse_query};
use crate::resource;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RestPipeline>,
    pub max_body_bytes: usize,
}

/// HTTP server for the API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `pipeline`.
    pub fn new(config: AppConfig, pipeline: Arc<RestPipeline>) -> Self {
        let state = AppState {
            pipeline,
            max_body_bytes: config.listener.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = request.request_id().unwrap_or("-"),
            )
        });

        Router::new()
            .route("/{*path}", any(api_handler))
            .route("/", any(api_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(trace)
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Router with all layers, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` triggers.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

const MULTIPART: &str = "multipart/form-data";

/// Form fields and uploaded file names of a request.
type FormData = (Map<String, Value>, Vec<String>);

/// Feed the request through the pipeline.
async fn api_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let url = match Url::parse(&format!("http://{host}{}", request.uri())) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(error = %e, uri = %request.uri(), "Unparseable request URL");
            let mut response = HttpResponse::new();
            response
                .set_code(400)
                .set_content_type(resource::TEXT)
                .write(&format!("Invalid URL: {e}"));
            return response.into_response();
        }
    };
    let http_request = HttpRequest::new(request.method().as_str(), url)
        .with_headers(request.headers().clone());
    let content_type = normalize(http_request.header("content-type").unwrap_or_default());

    let payload = if content_type.eq_ignore_ascii_case(MULTIPART) {
        read_multipart(request)
            .await
            .map(|(post, files)| (post, files, String::new()))
    } else {
        read_body(request.into_body(), state.max_body_bytes)
            .await
            .map(|body| {
                let post = if content_type.eq_ignore_ascii_case(resource::QUERY) {
                    parse_query(&body)
                } else {
                    Map::new()
                };
                (post, Vec::new(), body)
            })
    };

    match payload {
        Ok((post, files, body)) => {
            let http_request = http_request.with_post(post).with_files(files).with_body(body);
            state.pipeline.handle(&http_request).into_response()
        }
        Err(error) => state.pipeline.error_response(&http_request, &error).into_response(),
    }
}

/// Buffer the body as UTF-8 text, at most `limit` bytes.
async fn read_body(body: Body, limit: usize) -> Result<String, RestError> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| rejected(StatusCode::PAYLOAD_TOO_LARGE, e))?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| RestError::unsupported_media_type("Request body is not valid UTF-8"))
}

/// Text fields become form data; file parts are recorded by file name.
async fn read_multipart(request: Request<Body>) -> Result<FormData, RestError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| rejected(e.status(), e))?;

    let mut post = Map::new();
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| rejected(e.status(), e))? {
        if let Some(file_name) = field.file_name().map(str::to_string) {
            files.push(file_name);
            continue;
        }
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.map_err(|e| rejected(e.status(), e))?;
        post.insert(name, Value::String(value));
    }
    Ok((post, files))
}

fn rejected(status: StatusCode, error: impl std::fmt::Display) -> RestError {
    RestError::BadRequest {
        code: i64::from(status.as_u16()),
        message: format!("Request body rejected: {error}"),
        errors: Vec::new(),
    }
}
