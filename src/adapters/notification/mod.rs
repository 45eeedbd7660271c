//! Notifier adapters.
//!
//! - `BroadcastNotifier` - fans notifications out to UI subscribers
//! - `ConsoleNotifier` - prints notifications for the command-line client
//! - `RecordingNotifier` - remembers every notification for assertions

use std::sync::{Mutex, PoisonError};
use tokio::sync::{broadcast, watch};

use crate::domain::session::{Notification, Severity};
use crate::ports::Notifier;

/// Fans notifications out over a tokio `broadcast` channel.
///
/// Notifications sent while nobody is subscribed are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            tracing::debug!("Notification dropped, no subscribers");
        }
    }
}

/// Prints each notification as one line on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    fn render(notification: &Notification) -> String {
        let tag = match notification.severity {
            Severity::Success => "ok",
            Severity::Info => "info",
            Severity::Failure => "error",
        };
        format!("[{}] {}", tag, notification.message)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        println!("{}", Self::render(&notification));
    }
}

/// Records every notification in order.
#[derive(Debug)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
    count: watch::Sender<usize>,
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingNotifier {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            notifications: Mutex::new(Vec::new()),
            count,
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `(severity, message)` pairs, convenient for assertions.
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.notifications()
            .into_iter()
            .map(|n| (n.severity, n.message))
            .collect()
    }

    /// Wait until at least `count` notifications have arrived.
    pub async fn wait_for(&self, count: usize) {
        let mut seen = self.count.subscribe();
        let _ = seen.wait_for(|n| *n >= count).await;
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        let len = {
            let mut notifications = self
                .notifications
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            notifications.push(notification);
            notifications.len()
        };
        self.count.send_replace(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let notifier = BroadcastNotifier::new(8);
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        notifier.notify(Notification::success("Signed in as a@b.com"));

        assert_eq!(first.recv().await.unwrap().message, "Signed in as a@b.com");
        assert_eq!(second.recv().await.unwrap().severity, Severity::Success);
    }

    #[test]
    fn broadcast_without_subscribers_does_not_panic() {
        BroadcastNotifier::new(1).notify(Notification::info("nobody listening"));
    }

    #[test]
    fn console_rendering_tags_severity() {
        assert_eq!(
            ConsoleNotifier::render(&Notification::failure("Authentication Failed")),
            "[error] Authentication Failed"
        );
    }

    #[tokio::test]
    async fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();

        notifier.notify(Notification::failure("expired"));
        notifier.notify(Notification::success("Signed out"));
        notifier.wait_for(2).await;

        assert_eq!(
            notifier.entries(),
            vec![
                (Severity::Failure, "expired".to_string()),
                (Severity::Success, "Signed out".to_string()),
            ]
        );
    }
}
