//! LMS Admin Session - identity and session synchronization for the LMS admin client
//!
//! Keeps the client's persisted session in step with the external identity
//! provider and the LMS backend: sign-in, sign-out, user id resolution,
//! backend validation, and the navigation and notifications that follow.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
