//! Input validation subsystem.
//!
//! # Data Flow
//! ```text
//! presenter declares rules
//!     → scope.rs (field(name) get-or-create)
//!     → field.rs (ordered rules per field)
//!
//! request input
//!     → input.rs (data bound to scope)
//!     → validator.rs (built-in checks / type expressions)
//!     → FieldError list (first one is the headline message)
//! ```
//!
//! # Design Decisions
//! - Rule kinds dispatch through a table built at construction
//! - Violations are collected; configuration errors abort validation
//! - Optional fields with no value are not checked

pub mod error;
pub mod expression;
pub mod field;
pub mod format;
pub mod input;
pub mod rule;
pub mod scope;
pub mod validator;

pub use error::{FieldError, RuleViolation, ValidatorError};
pub use field::Field;
pub use input::Input;
pub use rule::{Expression, Rule, RuleKind};
pub use scope::{DefaultScopeFactory, ValidationScope, ValidationScopeFactory};
pub use validator::Validator;
