//! Application layer: presenters, content negotiation and the request
//! pipeline tying routing, validation and mapping together.
//!
//! # Data Flow
//! ```text
//! HttpRequest
//!     → pipeline.rs (route → input → validate → handle → render)
//!     → presenter.rs (application code per presenter)
//!     → negotiation.rs (Accept → response kind + mapper)
//!     → HttpResponse
//! ```

pub mod negotiation;
pub mod pipeline;
pub mod presenter;

pub use negotiation::{ResponseFactory, ResponseKind};
pub use pipeline::RestPipeline;
pub use presenter::{EchoPresenter, PresenterRegistry, ResourcePresenter};
