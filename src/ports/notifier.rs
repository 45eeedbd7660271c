//! Notifier port - user-visible banners for user-initiated actions.
//!
//! Background work never notifies; it logs instead.

use crate::domain::session::Notification;

/// Delivers notifications to whatever renders them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
