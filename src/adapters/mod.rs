//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the session orchestrator to external systems:
//! - `identity` - Identity provider (Firebase REST, mock) and federated prompts
//! - `backend` - LMS auth validation and classroom shim user search
//! - `storage` - Session store (JSON file, in-memory)
//! - `navigation` - Route changes for the UI loop
//! - `notification` - Notification delivery
//! - `gate` - Pausable checkpoint used by the mock adapters

pub mod backend;
pub mod gate;
pub mod identity;
pub mod navigation;
pub mod notification;
pub mod storage;

pub use backend::{
    BackendClient, HttpSessionValidator, MockSessionValidator, MockUserResolver, ShimUserResolver,
};
pub use gate::Gate;
pub use identity::{FirebaseConfig, FirebaseIdentityProvider, LinePrompt, MockIdentityProvider};
pub use navigation::{ChannelNavigator, RecordingNavigator};
pub use notification::{BroadcastNotifier, ConsoleNotifier, RecordingNotifier};
pub use storage::{FileSessionStore, InMemorySessionStore};
