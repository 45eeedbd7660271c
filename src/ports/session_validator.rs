//! Session validation port.
//!
//! Asks the backend whether it accepts the current access token. Used
//! as the gate before navigating into the authenticated application.
//!
//! The token is not passed in: the HTTP layer reads it from the session
//! store when it builds the request, the same way every other backend
//! call is authorized.

use async_trait::async_trait;

use crate::domain::session::{ValidationError, ValidationResult};

/// Confirms with the backend that the stored session is usable.
///
/// # Contract
///
/// Implementations must:
/// - Return `Ok(ValidationResult::Accepted)` when the backend accepts the token
/// - Return `Ok(ValidationResult::Rejected(reason))` when it answers but refuses
/// - Return `Err(ValidationError::Network)` when no answer could be obtained
#[async_trait]
pub trait SessionValidator: Send + Sync {
    async fn validate(&self) -> Result<ValidationResult, ValidationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::RwLock;

    struct TestSessionValidator {
        answer: RwLock<Result<ValidationResult, ValidationError>>,
    }

    #[async_trait]
    impl SessionValidator for TestSessionValidator {
        async fn validate(&self) -> Result<ValidationResult, ValidationError> {
            self.answer.read().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn validator_reports_rejection_reason() {
        let validator = TestSessionValidator {
            answer: RwLock::new(Ok(ValidationResult::Rejected("expired".into()))),
        };

        let result = validator.validate().await.unwrap();

        assert_eq!(result, ValidationResult::Rejected("expired".into()));
    }

    #[tokio::test]
    async fn validator_reports_network_errors() {
        let validator = TestSessionValidator {
            answer: RwLock::new(Err(ValidationError::Network("timeout".into()))),
        };

        assert!(matches!(
            validator.validate().await,
            Err(ValidationError::Network(_))
        ));
    }

    #[test]
    fn session_validator_trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SessionValidator>();
    }
}
