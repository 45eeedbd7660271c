//! Session storage and orchestration configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// File the session store persists to
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Pause between validation and navigating home, in milliseconds
    #[serde(default = "default_navigation_delay_ms")]
    pub navigation_delay_ms: u64,
}

impl SessionConfig {
    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.store_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("SESSION__STORE_PATH"));
        }
        if self.navigation_delay_ms > 10_000 {
            return Err(ValidationError::NavigationDelayTooLong);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            navigation_delay_ms: default_navigation_delay_ms(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".lms-admin/session.json")
}

fn default_navigation_delay_ms() -> u64 {
    50
}
