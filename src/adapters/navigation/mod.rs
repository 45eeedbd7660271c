//! Navigator adapters.
//!
//! - `ChannelNavigator` - publishes the current route on a `watch` channel
//!   for the UI loop to follow
//! - `RecordingNavigator` - remembers every route for assertions

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

use crate::domain::session::Route;
use crate::ports::Navigator;

/// Publishes route changes on a `watch` channel.
#[derive(Debug)]
pub struct ChannelNavigator {
    route: watch::Sender<Route>,
}

impl ChannelNavigator {
    /// Starts on `initial`.
    pub fn new(initial: Route) -> Self {
        let (route, _) = watch::channel(initial);
        Self { route }
    }

    pub fn current(&self) -> Route {
        *self.route.borrow()
    }

    /// Receiver that sees every later route change.
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.route.subscribe()
    }
}

#[async_trait]
impl Navigator for ChannelNavigator {
    async fn navigate(&self, route: Route) {
        tracing::debug!(route = %route, "Navigating");
        self.route.send_replace(route);
    }
}

/// Records every navigation in order.
#[derive(Debug)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
    count: watch::Sender<usize>,
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingNavigator {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            routes: Mutex::new(Vec::new()),
            count,
        }
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait until at least `count` navigations have happened.
    pub async fn wait_for(&self, count: usize) {
        let mut seen = self.count.subscribe();
        let _ = seen.wait_for(|n| *n >= count).await;
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate(&self, route: Route) {
        let len = {
            let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
            routes.push(route);
            routes.len()
        };
        self.count.send_replace(len);
    }
}
