//! Domain layer containing the session types and rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, field errors, state machine trait)
//! - `session` - Identities, the persisted session, status, and errors

pub mod foundation;
pub mod session;
