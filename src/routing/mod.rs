//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! HttpRequest (method, path, query, overrides)
//!     → node.rs (walk router tree, first match wins)
//!     → resource_route.rs / strict.rs (match one router)
//!     → Return: AppRequest or no-match
//!
//! OPTIONS lookup:
//!     Url → options.rs (simulate each resource route's method)
//!         → accepted method names
//!
//! Route Compilation (at startup):
//!     RoutingConfig + route files
//!     → factory.rs (compile masks via matcher.rs)
//!     → RouteList, immutable, cached until sources change
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)
//! - Method flags are wire-stable bit values

pub mod factory;
pub mod matcher;
pub mod method;
pub mod node;
pub mod options;
pub mod resource_route;
pub mod router;
pub mod strict;

pub use factory::{CachedRouteListFactory, ConfigRouteListFactory, FileRouteListFactory, RouteListFactory};
pub use matcher::Mask;
pub use method::{Method, MethodMask};
pub use node::{RouteList, RouterNode};
pub use options::MethodOptions;
pub use resource_route::ResourceRoute;
pub use router::{AppRequest, ResourceRouter, Router};
pub use strict::StrictRoute;
