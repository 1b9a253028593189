//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the mapper registry, response factory and route factories
//! - Assemble the request pipeline from validated configuration
//!
//! # Design Decisions
//! - Fail fast: the route list is built once here so broken routes are a
//!   startup error, not a per-request 500
//! - Route files are watched from here on; later breakage only logs
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::path::Path;
use std::sync::Arc;

use crate::application::{PresenterRegistry, ResponseFactory, RestPipeline};
use crate::config::{AppConfig, ConfigError};
use crate::mapping::MapperContext;
use crate::routing::{CachedRouteListFactory, ConfigRouteListFactory, RouteListFactory};
use crate::validation::DefaultScopeFactory;

/// Pipeline for `config`, dispatching to `presenters`.
pub fn build_pipeline(
    config: &AppConfig,
    presenters: PresenterRegistry,
) -> Result<RestPipeline, ConfigError> {
    let mappers = Arc::new(MapperContext::with_defaults());
    let responses = ResponseFactory::new(Arc::clone(&mappers), &config.negotiation);

    let routes = Arc::new(CachedRouteListFactory::new(ConfigRouteListFactory::new(
        config.routing.clone(),
    )));
    let module = config.routing.module.clone();
    routes.create(module.as_deref())?;
    if let Some(dir) = &config.routing.routes_dir {
        routes.watch(Path::new(dir))?;
    }

    tracing::info!(
        presenters = presenters.len(),
        default_content_type = %responses.default_content_type(),
        "Pipeline ready"
    );

    Ok(RestPipeline::new(
        routes,
        mappers,
        responses,
        presenters,
        Arc::new(DefaultScopeFactory::default()),
    )
    .with_module(module))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::EchoPresenter;
    use crate::config::parse_config;
    use crate::http::request::HttpRequest;
    use url::Url;

    #[test]
    fn test_build_and_route() {
        let config = parse_config(
            r#"
            [routing]
            strict_prefix = "api"
            "#,
        )
        .unwrap();
        let pipeline =
            build_pipeline(&config, PresenterRegistry::new().with_fallback(Arc::new(EchoPresenter)))
                .unwrap();

        let request = HttpRequest::new(
            "GET",
            Url::parse("http://localhost/api/users/posts/5").unwrap(),
        );
        let response = pipeline.handle(&request);
        assert_eq!(response.code(), 200);

        let body: serde_json::Value = serde_json::from_str(response.body()).unwrap();
        assert_eq!(body["action"], "readPosts");
        assert_eq!(body["params"]["params"], serde_json::json!(["5"]));
    }

    #[test]
    fn test_missing_routes_dir_fails_fast() {
        let config = parse_config(
            r#"
            [routing]
            routes_dir = "/nonexistent/routes"
            "#,
        )
        .unwrap();
        assert!(matches!(
            build_pipeline(&config, PresenterRegistry::new()),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_broken_route_file_edit_keeps_serving() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.toml");
        std::fs::write(
            &path,
            "[[resources]]\nmask = \"users/<id>\"\npresenter = \"Users\"\nactions = { GET = \"read\" }\n",
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.routing.routes_dir = Some(dir.path().display().to_string());
        let pipeline =
            build_pipeline(&config, PresenterRegistry::new().with_fallback(Arc::new(EchoPresenter)))
                .unwrap();
        let request = HttpRequest::new("GET", Url::parse("http://localhost/users/1").unwrap());
        assert_eq!(pipeline.handle(&request).code(), 200);

        std::fs::write(&path, "[[resources]]\nmask = \n").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(300));

        let response = pipeline.handle(&request);
        assert_eq!(response.code(), 200);
        assert!(!response.body().contains("TOML"));
    }
}
