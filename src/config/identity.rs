//! Identity provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::client::Environment;
use super::error::ValidationError;
use crate::adapters::identity::FirebaseConfig;
use crate::domain::session::FederatedProvider;

/// Identity provider configuration (Firebase Authentication)
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Web API key of the Firebase project
    pub api_key: SecretString,

    /// Identity Toolkit API base URL
    #[serde(default = "default_identity_base_url")]
    pub identity_base_url: String,

    /// Secure Token API base URL
    #[serde(default = "default_token_base_url")]
    pub token_base_url: String,

    /// Provider id offered for federated sign-in
    #[serde(default = "default_federated_provider")]
    pub federated_provider: String,

    /// Continue URI sent with federated sign-ins
    #[serde(default = "default_request_uri")]
    pub request_uri: String,
}

impl IdentityConfig {
    pub fn federated_provider(&self) -> FederatedProvider {
        FederatedProvider::new(self.federated_provider.clone())
    }

    /// Settings for the Firebase adapter
    pub fn firebase(&self) -> FirebaseConfig {
        FirebaseConfig::new(self.api_key.clone())
            .with_base_urls(self.identity_base_url.clone(), self.token_base_url.clone())
            .with_request_uri(self.request_uri.clone())
    }

    /// Validate identity configuration
    ///
    /// In production, requires HTTPS for both API base URLs.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("IDENTITY__API_KEY"));
        }
        if self.federated_provider.trim().is_empty() {
            return Err(ValidationError::MissingRequired("IDENTITY__FEDERATED_PROVIDER"));
        }

        for (name, url) in [
            ("IDENTITY__IDENTITY_BASE_URL", &self.identity_base_url),
            ("IDENTITY__TOKEN_BASE_URL", &self.token_base_url),
        ] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ValidationError::InvalidUrl(name));
            }
            if *environment == Environment::Production && !url.starts_with("https://") {
                return Err(ValidationError::MustBeHttps(name));
            }
        }

        Ok(())
    }
}

fn default_identity_base_url() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}

fn default_token_base_url() -> String {
    "https://securetoken.googleapis.com".to_string()
}

fn default_federated_provider() -> String {
    "google.com".to_string()
}

fn default_request_uri() -> String {
    "http://localhost".to_string()
}
