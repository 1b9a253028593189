//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http::server (trace span per request, carries x-request-id)
//! application::pipeline
//!     → logging.rs (tracing subscriber: text or JSON lines)
//!     → metrics.rs (request counters, latency histogram,
//!                   validation failures, error statuses)
//!
//! Prometheus scrapes the exporter on observability.metrics_address.
//! ```
//!
//! # Design Decisions
//! - Both are opt-in from `[observability]`; the library never installs
//!   a global subscriber or recorder on its own
//! - Without a recorder, metric macros are no-ops

pub mod logging;
pub mod metrics;
