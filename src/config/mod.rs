//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `LMS_ADMIN` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use lms_admin_session::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Session stored in {}", config.session.store_path.display());
//! ```

mod backend;
mod client;
mod error;
mod identity;
mod session;

pub use backend::BackendConfig;
pub use client::{ClientConfig, Environment};
pub use error::{ConfigError, ValidationError};
pub use identity::IdentityConfig;
pub use session::SessionConfig;

use serde::Deserialize;

use crate::application::OrchestratorConfig;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Client process configuration (environment, logging)
    #[serde(default)]
    pub client: ClientConfig,

    /// Identity provider configuration (Firebase)
    pub identity: IdentityConfig,

    /// LMS backend endpoints
    pub backend: BackendConfig,

    /// Session store and orchestration settings
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `LMS_ADMIN` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `LMS_ADMIN__IDENTITY__API_KEY=...` -> `identity.api_key = ...`
    /// - `LMS_ADMIN__BACKEND__AUTH_BASE_URL=...` -> `backend.auth_base_url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LMS_ADMIN")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - Required values and URL formats
    /// - Timeout and delay bounds
    /// - Production-specific requirements (HTTPS)
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.client.validate()?;
        self.identity.validate(&self.client.environment)?;
        self.backend.validate(&self.client.environment)?;
        self.session.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.client.is_production()
    }

    /// Orchestrator settings derived from the session and identity sections
    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig::default()
            .with_navigation_delay(self.session.navigation_delay())
            .with_federated_provider(self.identity.federated_provider())
    }
}
