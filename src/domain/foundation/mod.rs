//! Foundation module - Shared domain primitives.
//!
//! Identifiers, field validation errors, and the state machine trait
//! used by the session lifecycle.

mod errors;
mod ids;
mod state_machine;

pub use errors::FieldError;
pub use ids::UserId;
pub use state_machine::StateMachine;
