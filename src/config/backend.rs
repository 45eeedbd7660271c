//! LMS backend configuration

use serde::Deserialize;
use std::time::Duration;

use super::client::Environment;
use super::error::ValidationError;

/// Backend endpoints used by the session subsystem
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Auth service base URL (serves `/validate`)
    pub auth_base_url: String,

    /// Classroom shim base URL (serves `/user/search/email`)
    pub shim_base_url: String,

    /// Request timeout in seconds. Unset means requests may wait forever.
    pub request_timeout_secs: Option<u64>,
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Validate backend configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        for (name, url) in [
            ("BACKEND__AUTH_BASE_URL", &self.auth_base_url),
            ("BACKEND__SHIM_BASE_URL", &self.shim_base_url),
        ] {
            if url.is_empty() {
                return Err(ValidationError::MissingRequired(name));
            }
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ValidationError::InvalidUrl(name));
            }
            if *environment == Environment::Production && !url.starts_with("https://") {
                return Err(ValidationError::MustBeHttps(name));
            }
        }

        if let Some(secs) = self.request_timeout_secs {
            if secs == 0 || secs > 300 {
                return Err(ValidationError::InvalidTimeout);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig {
            auth_base_url: "https://lms.example.com/auth/api/v1".to_string(),
            shim_base_url: "https://lms.example.com/classroom-shim/api/v1".to_string(),
            request_timeout_secs: None,
        }
    }

    #[test]
    fn test_no_timeout_by_default() {
        assert_eq!(config().request_timeout(), None);
        assert!(config().validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_missing_auth_url() {
        let config = BackendConfig {
            auth_base_url: String::new(),
            ..config()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::MissingRequired("BACKEND__AUTH_BASE_URL"))
        );
    }

    #[test]
    fn test_plain_http_rejected_in_production() {
        let config = BackendConfig {
            shim_base_url: "http://localhost:8081".to_string(),
            ..config()
        };
        assert!(config.validate(&Environment::Development).is_ok());
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::MustBeHttps("BACKEND__SHIM_BASE_URL"))
        );
    }

    #[test]
    fn test_validation_invalid_timeout() {
        let config = BackendConfig {
            request_timeout_secs: Some(0),
            ..config()
        };
        assert_eq!(config.validate(&Environment::Development), Err(ValidationError::InvalidTimeout));

        let config = BackendConfig {
            request_timeout_secs: Some(30),
            ..config
        };
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }
}
