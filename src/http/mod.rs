//! HTTP boundary.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (HttpRequest: URL, headers, decoded query, body; request ID)
//!     → [application pipeline]
//!     → response.rs (ApiResponse renders into HttpResponse)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{HttpRequest, MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
pub use response::{ApiResponse, ErrorResponse, HttpResponse, JsonpResponse, TextResponse};
pub use server::HttpServer;
