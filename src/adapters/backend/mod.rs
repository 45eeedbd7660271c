//! LMS backend adapters.
//!
//! - `BackendClient` - shared HTTP client that authorizes every request
//!   with the bearer token from the session store
//! - `HttpSessionValidator` - `SessionValidator` over `GET {auth}/validate`
//! - `ShimUserResolver` - `UserResolver` over the classroom shim user search
//! - `MockUserResolver`, `MockSessionValidator` - scripted stand-ins for tests

mod client;
mod mock;
mod user_search;
mod validator;

pub use client::BackendClient;
pub(crate) use client::join_url;
pub use mock::{MockSessionValidator, MockUserResolver};
pub use user_search::ShimUserResolver;
pub use validator::HttpSessionValidator;
