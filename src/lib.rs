//! REST API toolkit: resource routing, content negotiation, request
//! validation and response mapping, served over axum.

pub mod application;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod mapping;
pub mod observability;
pub mod resource;
pub mod routing;
pub mod validation;

pub use application::{PresenterRegistry, ResourcePresenter, RestPipeline};
pub use config::schema::AppConfig;
pub use error::{RestError, RestResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resource::Resource;
