//! Content mapping subsystem.
//!
//! # Data Flow
//! ```text
//! Content-Type / negotiated type
//!     → context.rs (normalize, look up mapper; miss = hard error)
//!     → Mapper::stringify (resource → wire string)
//!     → Mapper::parse     (request body → mapping)
//! ```
//!
//! # Design Decisions
//! - Registry is built at startup and read-only afterwards
//! - Content type parameters (`; charset=...`) never affect lookup
//! - No implicit fallback mapper

pub mod context;
pub mod json;
pub mod null;
pub mod query;

use serde_json::{Map, Value};
use thiserror::Error;

pub use context::MapperContext;
pub use json::JsonMapper;
pub use null::NullMapper;
pub use query::QueryMapper;

/// Errors raised while converting between payloads and wire strings.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("JSON mapping failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Malformed(String),
}

/// Bidirectional converter for one content type.
pub trait Mapper: Send + Sync + std::fmt::Debug {
    /// Convert a payload to its wire representation.
    fn stringify(&self, data: &Value, pretty_print: bool) -> Result<String, MappingError>;

    /// Convert a request body to a mapping.
    fn parse(&self, raw: &str) -> Result<Map<String, Value>, MappingError>;
}
