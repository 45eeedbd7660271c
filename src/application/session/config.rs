//! Orchestrator tuning.

use std::time::Duration;

use crate::domain::session::FederatedProvider;

/// Configuration for the `SessionOrchestrator`.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Pause between a successful validation and navigating home, so the
    /// success banner is visible before the surface changes.
    pub navigation_delay: Duration,

    /// Provider used by `sign_in_with_federated_provider`.
    pub federated_provider: FederatedProvider,

    /// Capacity of the identity re-broadcast channel.
    pub event_buffer: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            navigation_delay: Duration::from_millis(50),
            federated_provider: FederatedProvider::google(),
            event_buffer: 16,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }

    pub fn with_federated_provider(mut self, provider: FederatedProvider) -> Self {
        self.federated_provider = provider;
        self
    }

    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }
}
