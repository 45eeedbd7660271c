//! Session orchestration.
//!
//! `SessionOrchestrator` drives sign-in, sign-out and the post-identity
//! pipeline; `start` runs the identity event listener and hands back an
//! `OrchestratorHandle`.

mod config;
mod intake;
mod listener;
mod orchestrator;

pub use config::OrchestratorConfig;
pub use listener::OrchestratorHandle;
pub use orchestrator::SessionOrchestrator;
