//! Mock backend adapters for testing.
//!
//! Implement `UserResolver` and `SessionValidator` without a server.
//! Both count their calls and can be paused through a [`Gate`] to hold a
//! pipeline step in flight.
//!
//! # Example
//!
//! ```ignore
//! let resolver = MockUserResolver::new().with_user("a@b.com", "U1");
//! let validator = MockSessionValidator::rejecting("expired");
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::adapters::gate::Gate;
use crate::domain::foundation::UserId;
use crate::domain::session::{ValidationError, ValidationResult};
use crate::ports::{ResolutionError, SessionValidator, UserResolver};

/// Mock user resolver backed by an email to id map.
///
/// Unknown emails return `NotFound`.
#[derive(Debug, Default)]
pub struct MockUserResolver {
    users: RwLock<HashMap<String, UserId>>,
    force_error: RwLock<Option<ResolutionError>>,
    gate: Gate,
    calls: AtomicUsize,
}

impl MockUserResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user. Panics on a blank id, which is a test bug.
    pub fn with_user(self, email: impl Into<String>, user_id: &str) -> Self {
        self.add_user(email, user_id);
        self
    }

    /// Forces every lookup to fail with `error`.
    pub fn with_error(self, error: ResolutionError) -> Self {
        *self.force_error.write().unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    pub fn add_user(&self, email: impl Into<String>, user_id: &str) {
        let user_id = UserId::new(user_id).unwrap_or_else(|e| panic!("bad test user id: {}", e));
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(email.into(), user_id);
    }

    pub fn clear_error(&self) {
        *self.force_error.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Checkpoint every lookup passes before answering.
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserResolver for MockUserResolver {
    async fn resolve_user_id(&self, email: &str) -> Result<UserId, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.pass().await;

        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }

        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(email)
            .cloned()
            .ok_or(ResolutionError::NotFound)
    }
}

/// Mock session validator with a settable answer.
#[derive(Debug)]
pub struct MockSessionValidator {
    answer: RwLock<Result<ValidationResult, ValidationError>>,
    gate: Gate,
    calls: AtomicUsize,
}

impl Default for MockSessionValidator {
    fn default() -> Self {
        Self::accepting()
    }
}

impl MockSessionValidator {
    fn answering(answer: Result<ValidationResult, ValidationError>) -> Self {
        Self {
            answer: RwLock::new(answer),
            gate: Gate::opened(),
            calls: AtomicUsize::new(0),
        }
    }

    /// A validator that accepts every session.
    pub fn accepting() -> Self {
        Self::answering(Ok(ValidationResult::Accepted))
    }

    /// A validator that refuses every session with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self::answering(Ok(ValidationResult::Rejected(reason.into())))
    }

    /// A validator whose backend cannot be reached.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::answering(Err(ValidationError::Network(message.into())))
    }

    pub fn set_answer(&self, answer: Result<ValidationResult, ValidationError>) {
        *self.answer.write().unwrap_or_else(PoisonError::into_inner) = answer;
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self) -> Result<ValidationResult, ValidationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.pass().await;
        self.answer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolver_returns_registered_user() {
        let resolver = MockUserResolver::new().with_user("a@b.com", "U1");

        let id = resolver.resolve_user_id("a@b.com").await.unwrap();

        assert_eq!(id.as_str(), "U1");
        assert_eq!(resolver.call_count(), 1);
    }

    #[tokio::test]
    async fn resolver_unknown_email_is_not_found() {
        let resolver = MockUserResolver::new();

        assert_eq!(
            resolver.resolve_user_id("x@y.com").await,
            Err(ResolutionError::NotFound)
        );
    }

    #[tokio::test]
    async fn resolver_forced_error_wins_until_cleared() {
        let resolver = MockUserResolver::new()
            .with_user("a@b.com", "U1")
            .with_error(ResolutionError::Network("refused".into()));

        assert!(resolver.resolve_user_id("a@b.com").await.is_err());

        resolver.clear_error();
        assert!(resolver.resolve_user_id("a@b.com").await.is_ok());
    }

    #[tokio::test]
    async fn validator_answers_can_change() {
        let validator = MockSessionValidator::rejecting("expired");
        assert_eq!(
            validator.validate().await,
            Ok(ValidationResult::Rejected("expired".into()))
        );

        validator.set_answer(Ok(ValidationResult::Accepted));
        assert_eq!(validator.validate().await, Ok(ValidationResult::Accepted));
        assert_eq!(validator.call_count(), 2);
    }
}
