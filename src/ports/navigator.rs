//! Navigator port - client-side route changes requested by the session subsystem.

use async_trait::async_trait;

use crate::domain::session::Route;

/// Moves the client to another surface.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, route: Route);
}
