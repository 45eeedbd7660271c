//! Application layer - use cases over the ports.
//!
//! The session orchestrator is the only writer of the session store and
//! the single consumer of the identity provider's event stream.

pub mod session;

pub use session::{OrchestratorConfig, OrchestratorHandle, SessionOrchestrator};
