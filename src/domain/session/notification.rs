//! User-visible notifications emitted for user-initiated actions.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a notification should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Failure,
}

/// A transient banner message for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub issued_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            issued_at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Failure)
    }

    pub fn is_failure(&self) -> bool {
        self.severity == Severity::Failure
    }
}
