//! Identity provider adapters.
//!
//! - `FirebaseIdentityProvider` - Firebase Authentication over its REST API
//! - `MockIdentityProvider` - scripted provider for tests
//! - `LinePrompt` - federated prompt reading a pasted id token

mod firebase;
mod mock;
mod prompt;

pub use firebase::{FirebaseConfig, FirebaseIdentityProvider};
pub use mock::MockIdentityProvider;
pub use prompt::LinePrompt;
