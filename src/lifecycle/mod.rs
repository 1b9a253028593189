//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! startup.rs:
//!     AppConfig → mappers + response factory + cached route factory
//!              → RestPipeline (route list built once, errors are fatal)
//!
//! signals.rs:
//!     SIGINT / SIGTERM → Shutdown::trigger
//!
//! shutdown.rs:
//!     trigger → server stops accepting → in-flight requests finish
//!             → main gives up after timeouts.shutdown_secs
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::build_pipeline;
