//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the session orchestrator and the outside world. Adapters implement them.
//!
//! ## Identity
//!
//! - `IdentityProvider` - External sign-in service and its event stream
//! - `FederatedPrompt` - The popup that yields a federated credential
//!
//! ## Backend
//!
//! - `UserResolver` - Email to internal user id lookup
//! - `SessionValidator` - Backend acceptance check for the stored token
//!
//! ## Client
//!
//! - `SessionStore` - Durable session key/value storage
//! - `Navigator` - Route changes
//! - `Notifier` - User-visible notifications

mod federated_prompt;
mod identity_provider;
mod navigator;
mod notifier;
mod session_store;
mod session_validator;
mod user_resolver;

pub use federated_prompt::FederatedPrompt;
pub use identity_provider::{IdentityEventStream, IdentityProvider};
pub use navigator::Navigator;
pub use notifier::Notifier;
pub use session_store::{SessionStore, SessionStoreError};
pub use session_validator::SessionValidator;
pub use user_resolver::{ResolutionError, UserResolver};
