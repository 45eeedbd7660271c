//! Session domain module.
//!
//! Types describing who is signed in to the admin client and what the
//! session subsystem reports to the rest of the application:
//!
//! - `Identity` / `IdentityEvent` - principals and sign-in state changes
//!   emitted by the identity provider
//! - `Session` / `SessionKey` - the persisted session and its storage keys
//! - `SessionStatus` - the per-process authentication state machine
//! - `AuthError`, `ValidationError` - failures reported to callers
//! - `Notification`, `Route` - outputs consumed by UI collaborators

mod errors;
mod identity;
mod notification;
mod record;
mod route;
mod status;
mod validation;

pub use errors::AuthError;
pub use identity::{FederatedProvider, IdpCredential, Identity, IdentityEvent};
pub use notification::{Notification, Severity};
pub use record::{AccessToken, Session, SessionKey};
pub use route::Route;
pub use status::{Completeness, SessionStatus};
pub use validation::{ValidationError, ValidationResult};
