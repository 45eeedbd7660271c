//! Outcome of asking the backend whether the current session is accepted.

use thiserror::Error;

use super::AuthError;

/// What the backend said about the current access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Accepted,
    Rejected(String),
}

impl ValidationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted)
    }

    /// Turns a rejection into `ValidationError::Rejected`.
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationResult::Accepted => Ok(()),
            ValidationResult::Rejected(reason) => Err(ValidationError::Rejected(reason)),
        }
    }
}

/// Errors from the session validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Session rejected: {0}")]
    Rejected(String),

    #[error("Validation request failed: {0}")]
    Network(String),
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Rejected(reason) => AuthError::Rejected(reason),
            ValidationError::Network(message) => AuthError::Network(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_converts_to_ok() {
        assert!(ValidationResult::Accepted.is_accepted());
        assert_eq!(ValidationResult::Accepted.into_result(), Ok(()));
    }

    #[test]
    fn rejected_converts_to_rejected_error() {
        let result = ValidationResult::Rejected("expired".into());
        assert!(!result.is_accepted());
        assert_eq!(
            result.into_result(),
            Err(ValidationError::Rejected("expired".into()))
        );
    }

    #[test]
    fn validation_errors_map_to_auth_errors() {
        assert_eq!(
            AuthError::from(ValidationError::Rejected("expired".into())),
            AuthError::Rejected("expired".into())
        );
        assert!(AuthError::from(ValidationError::Network("timeout".into())).is_transient());
    }
}
