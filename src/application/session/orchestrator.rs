//! SessionOrchestrator - keeps the session store in step with the identity provider.
//!
//! Every sign-in, whether the user asked for it or the provider announced
//! it on its own, goes through the same post-identity pipeline:
//!
//! 1. Force-refresh the access token
//! 2. Persist email, token and display name in one write (dropping any
//!    previous `userId`)
//! 3. Resolve the internal user id; failure leaves the session degraded
//! 4. Validate with the backend; on acceptance navigate home after
//!    `navigation_delay`
//!
//! ## Overlapping runs
//!
//! The write gate holds the current generation. Each run takes a new
//! generation when it starts, and every store write, status change and
//! navigation happens under the gate after checking the run's generation
//! is still current. A run that finds itself overtaken stops with
//! `AuthError::Superseded` and writes nothing more, so the store always
//! reflects one run in full. Sign-out bumps the generation and clears the
//! store while holding the gate, so its clear is the last write.
//!
//! ## Notifications
//!
//! User-initiated operations (`sign_in_*`, `sign_out`, `retry_resolution`,
//! `revalidate`) emit exactly one notification each. Runs started by the
//! provider's event stream only log.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use secrecy::SecretString;
use tokio::sync::{broadcast, watch, Mutex, MutexGuard, Notify};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use super::intake::{Intake, PendingSignIn};
use super::OrchestratorConfig;
use crate::domain::foundation::StateMachine;
use crate::domain::session::{
    AccessToken, AuthError, Completeness, Identity, IdentityEvent, Notification, Route, Session,
    SessionKey, SessionStatus, ValidationResult,
};
use crate::ports::{
    IdentityProvider, Navigator, Notifier, ResolutionError, SessionStore, SessionValidator,
    UserResolver,
};

/// What started a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Trigger {
    /// An explicit `sign_in_*` call.
    User,
    /// A `SignedIn` event the orchestrator did not ask for.
    Background,
}

impl Trigger {
    fn as_str(&self) -> &'static str {
        match self {
            Trigger::User => "user",
            Trigger::Background => "background",
        }
    }
}

/// Synchronizes identity provider state, the session store and the
/// backend's view of the user.
pub struct SessionOrchestrator {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn SessionStore>,
    resolver: Arc<dyn UserResolver>,
    validator: Arc<dyn SessionValidator>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    config: OrchestratorConfig,
    // Write gate. Holds the generation of the newest run or sign-out.
    gate: Mutex<u64>,
    // Lock order: intake before gate. Never held across a provider sign-in.
    pub(super) intake: Arc<Mutex<Intake>>,
    // Wakes the listener when held sign-in events can be released.
    pub(super) released: Arc<Notify>,
    status: watch::Sender<SessionStatus>,
    pub(super) identity_events: broadcast::Sender<IdentityEvent>,
}

impl SessionOrchestrator {
    /// Creates an orchestrator with the default configuration.
    ///
    /// The initial status reflects whatever session the store already holds.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn SessionStore>,
        resolver: Arc<dyn UserResolver>,
        validator: Arc<dyn SessionValidator>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let config = OrchestratorConfig::default();
        let initial = SessionStatus::from_session(store.session().as_ref());
        let (status, _) = watch::channel(initial);
        let (identity_events, _) = broadcast::channel(config.event_buffer);
        Self {
            provider,
            store,
            resolver,
            validator,
            navigator,
            notifier,
            config,
            gate: Mutex::new(0),
            intake: Arc::new(Mutex::new(Intake::default())),
            released: Arc::new(Notify::new()),
            status,
            identity_events,
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        let (identity_events, _) = broadcast::channel(config.event_buffer);
        self.identity_events = identity_events;
        self.config = config;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub(super) fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Queries
    // ════════════════════════════════════════════════════════════════════════════

    /// The stored session. Synchronous, never touches the network.
    pub fn current_session(&self) -> Option<Session> {
        self.store.session()
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Receiver that sees every status change.
    pub fn watch_status(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Identity changes as seen by the event listener.
    ///
    /// Only fed while the listener started by `start` is running. A
    /// subscriber that falls more than `event_buffer` events behind skips
    /// the ones it missed.
    pub fn observe_identity(&self) -> BoxStream<'static, IdentityEvent> {
        BroadcastStream::new(self.identity_events.subscribe())
            .filter_map(|event| async move {
                match event {
                    Ok(event) => Some(event),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Identity observer lagged");
                        None
                    }
                }
            })
            .boxed()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // User-initiated operations
    // ════════════════════════════════════════════════════════════════════════════

    /// Signs in with email and password, then runs the pipeline.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        tracing::info!(email = %email, "Password sign-in requested");
        let result = self
            .explicit_sign_in(self.provider.sign_in_with_password(email, password))
            .await;
        self.report_sign_in(&result);
        result
    }

    /// Signs in through the configured federated provider, then runs the pipeline.
    pub async fn sign_in_with_federated_provider(&self) -> Result<Session, AuthError> {
        let provider = &self.config.federated_provider;
        tracing::info!(provider = %provider, "Federated sign-in requested");
        let result = self
            .explicit_sign_in(self.provider.sign_in_with_popup(provider))
            .await;
        self.report_sign_in(&result);
        result
    }

    /// Signs out and clears the session store.
    ///
    /// The store is cleared and the client sent to the sign-in surface even
    /// when the provider's sign-out fails; that failure is only logged.
    /// Any pipeline still in flight is superseded.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let result = self.end_session().await;
        match &result {
            Ok(()) => self.notifier.notify(Notification::success("Signed out")),
            Err(err) => self.notifier.notify(Notification::failure(err.user_message())),
        }
        result
    }

    /// Tries step 3 again for a degraded session.
    pub async fn retry_resolution(&self) -> Result<Session, AuthError> {
        let result = self.resolve_again().await;
        match &result {
            Ok(session) => self.notifier.notify(Notification::success(format!(
                "Linked {} to the LMS",
                session.email
            ))),
            Err(err) => self.report_failure(err),
        }
        result
    }

    /// Asks the backend again whether it accepts the stored session, and
    /// navigates home if it does.
    pub async fn revalidate(&self) -> Result<Session, AuthError> {
        let result = self.validate_again().await;
        match &result {
            Ok(_) => self.notifier.notify(Notification::success("Session validated")),
            Err(err) => self.report_failure(err),
        }
        result
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Pipeline
    // ════════════════════════════════════════════════════════════════════════════

    async fn explicit_sign_in<F>(&self, sign_in: F) -> Result<Session, AuthError>
    where
        F: std::future::Future<Output = Result<Identity, AuthError>>,
    {
        let pending = PendingSignIn::begin(&self.intake, &self.released).await;
        let outcome = sign_in.await;

        let mut intake = self.intake.lock().await;
        let overtaken = pending.settle(&mut intake, outcome.as_ref().ok());
        let identity = outcome?;

        if overtaken {
            tracing::info!(uid = %identity.uid, "Sign-out ran while signing in, signing out again");
            self.undo_provider_sign_in(&mut intake).await;
            return Err(AuthError::Superseded);
        }
        if !identity.has_email() {
            tracing::warn!(uid = %identity.uid, "Signed-in account has no email, not starting a session");
            self.undo_provider_sign_in(&mut intake).await;
            return Err(AuthError::MissingEmail);
        }

        let generation = self.begin_run().await;
        drop(intake);
        self.finish_run(generation, &identity, Trigger::User).await
    }

    /// Takes a new generation and marks the session as authenticating.
    pub(super) async fn begin_run(&self) -> u64 {
        let mut gate = self.gate.lock().await;
        *gate += 1;
        self.set_status(SessionStatus::Authenticating);
        *gate
    }

    /// Steps 1-4 for a run that already holds `generation`.
    pub(super) async fn finish_run(
        &self,
        generation: u64,
        identity: &Identity,
        trigger: Trigger,
    ) -> Result<Session, AuthError> {
        let result = self.post_identity(generation, identity).await;
        match &result {
            Ok(session) => tracing::info!(
                email = %session.email,
                degraded = session.is_degraded(),
                generation,
                trigger = trigger.as_str(),
                "Session established"
            ),
            Err(AuthError::Superseded) => tracing::debug!(
                generation,
                trigger = trigger.as_str(),
                "Pipeline run superseded"
            ),
            Err(err) => {
                tracing::warn!(
                    email = %identity.email,
                    error = %err,
                    generation,
                    trigger = trigger.as_str(),
                    "Session pipeline failed"
                );
                self.settle_status(generation).await;
            }
        }
        result
    }

    async fn post_identity(&self, generation: u64, identity: &Identity) -> Result<Session, AuthError> {
        // Step 1
        let token = self.provider.get_id_token(true).await?;

        // Step 2
        {
            let _gate = self.hold(generation).await?;
            self.store.replace_all(&Self::identity_entries(identity, &token)).await?;
        }

        // Step 3
        let internal_user_id = match self.resolver.resolve_user_id(&identity.email).await {
            Ok(user_id) => {
                let _gate = self.hold(generation).await?;
                match self
                    .store
                    .set_all(&[(SessionKey::UserId, user_id.to_string())])
                    .await
                {
                    Ok(()) => Some(user_id),
                    Err(err) => {
                        tracing::warn!(error = %err, "Could not store user id, session degraded");
                        None
                    }
                }
            }
            Err(ResolutionError::NotFound) => {
                tracing::warn!(email = %identity.email, "No LMS user for email, session degraded");
                None
            }
            Err(err) => {
                tracing::warn!(email = %identity.email, error = %err, "User lookup failed, session degraded");
                None
            }
        };

        let session = Session {
            email: identity.email.clone(),
            access_token: token,
            internal_user_id,
            display_name: identity.display_name.clone(),
        };

        // Step 4
        match self.validator.validate().await? {
            ValidationResult::Accepted => {
                self.navigate_home(generation, &session).await?;
                Ok(session)
            }
            ValidationResult::Rejected(reason) => Err(AuthError::Rejected(reason)),
        }
    }

    fn identity_entries(identity: &Identity, token: &AccessToken) -> Vec<(SessionKey, String)> {
        let mut entries = vec![
            (SessionKey::UserEmail, identity.email.clone()),
            (SessionKey::IdToken, token.expose().to_string()),
        ];
        if let Some(name) = &identity.display_name {
            entries.push((SessionKey::DisplayName, name.clone()));
        }
        entries
    }

    /// Marks the session authenticated, waits, then navigates home once.
    async fn navigate_home(&self, generation: u64, session: &Session) -> Result<(), AuthError> {
        {
            let _gate = self.hold(generation).await?;
            self.set_status(SessionStatus::from_session(Some(session)));
        }

        tokio::time::sleep(self.config.navigation_delay).await;

        let _gate = self.hold(generation).await?;
        self.navigator.navigate(Route::Home).await;
        Ok(())
    }

    /// Locks the write gate if `generation` is still current.
    async fn hold(&self, generation: u64) -> Result<MutexGuard<'_, u64>, AuthError> {
        let gate = self.gate.lock().await;
        if *gate == generation {
            Ok(gate)
        } else {
            Err(AuthError::Superseded)
        }
    }

    /// After a failed run, derive the status from what the store holds.
    async fn settle_status(&self, generation: u64) {
        if let Ok(_gate) = self.hold(generation).await {
            self.set_status(SessionStatus::from_session(self.store.session().as_ref()));
        }
    }

    fn set_status(&self, next: SessionStatus) {
        self.status.send_if_modified(|status| {
            if *status == next {
                return false;
            }
            if let Err(err) = status.transition_to(next) {
                tracing::warn!(error = %err, "Unexpected session status change");
            }
            tracing::debug!(from = ?status, to = ?next, "Session status changed");
            *status = next;
            true
        });
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Sign-out
    // ════════════════════════════════════════════════════════════════════════════

    async fn end_session(&self) -> Result<(), AuthError> {
        let mut intake = self.intake.lock().await;
        intake.begin_sign_out();
        let mut gate = self.gate.lock().await;
        *gate += 1;
        self.set_status(SessionStatus::Anonymous);

        match self.provider.sign_out().await {
            Ok(()) => intake.expect_signed_out(),
            Err(err) => tracing::warn!(
                error = %err,
                "Identity provider sign-out failed, clearing local session"
            ),
        }
        drop(intake);

        let cleared = self.store.clear().await;
        self.navigator.navigate(Route::SignIn).await;
        tracing::info!(generation = *gate, "Signed out");
        cleared.map_err(AuthError::from)
    }

    /// Signs the provider back out after a sign-in that must not become a
    /// session. The local store is left alone.
    async fn undo_provider_sign_in(&self, intake: &mut Intake) {
        match self.provider.sign_out().await {
            Ok(()) => intake.expect_signed_out(),
            Err(err) => tracing::warn!(error = %err, "Identity provider sign-out failed"),
        }
    }

    /// Handles a `SignedOut` the orchestrator did not ask for.
    pub(super) async fn end_session_in_background(&self) {
        let mut gate = self.gate.lock().await;
        if self.status() == SessionStatus::Anonymous && self.store.is_empty() {
            tracing::debug!("Provider signed out with no local session");
            return;
        }

        *gate += 1;
        self.set_status(SessionStatus::Anonymous);
        if let Err(err) = self.store.clear().await {
            tracing::warn!(error = %err, "Failed to clear session after provider sign-out");
        }
        self.navigator.navigate(Route::SignIn).await;
        tracing::info!(generation = *gate, "Session ended by identity provider");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Retries
    // ════════════════════════════════════════════════════════════════════════════

    async fn resolve_again(&self) -> Result<Session, AuthError> {
        let generation = *self.gate.lock().await;
        let session = self.store.session().ok_or(AuthError::NotSignedIn)?;
        let user_id = self.resolver.resolve_user_id(&session.email).await?;

        let _gate = self.hold(generation).await?;
        // A run that started earlier may have replaced the session meanwhile.
        if self.store.get(SessionKey::UserEmail).as_deref() != Some(session.email.as_str()) {
            return Err(AuthError::Superseded);
        }
        self.store
            .set_all(&[(SessionKey::UserId, user_id.to_string())])
            .await?;
        if self.status().is_authenticated() {
            self.set_status(SessionStatus::Authenticated(Completeness::Complete));
        }
        tracing::info!(email = %session.email, user_id = %user_id, "User id resolved on retry");

        Ok(Session {
            internal_user_id: Some(user_id),
            ..session
        })
    }

    async fn validate_again(&self) -> Result<Session, AuthError> {
        let generation = *self.gate.lock().await;
        let session = self.store.session().ok_or(AuthError::NotSignedIn)?;
        self.validator.validate().await?.into_result()?;
        self.navigate_home(generation, &session).await?;
        Ok(session)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Notifications
    // ════════════════════════════════════════════════════════════════════════════

    fn report_sign_in(&self, result: &Result<Session, AuthError>) {
        match result {
            Ok(session) => self.notifier.notify(Notification::success(format!(
                "Signed in as {}",
                session.email
            ))),
            Err(err) => self.report_failure(err),
        }
    }

    fn report_failure(&self, err: &AuthError) {
        match err {
            AuthError::Cancelled | AuthError::Superseded => {
                self.notifier.notify(Notification::info(err.user_message()))
            }
            _ => self.notifier.notify(Notification::failure(err.user_message())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::backend::{MockSessionValidator, MockUserResolver};
    use crate::adapters::identity::MockIdentityProvider;
    use crate::adapters::navigation::RecordingNavigator;
    use crate::adapters::notification::RecordingNotifier;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::session::Severity;
    use std::time::Duration;

    struct Fixture {
        provider: Arc<MockIdentityProvider>,
        store: Arc<InMemorySessionStore>,
        resolver: Arc<MockUserResolver>,
        validator: Arc<MockSessionValidator>,
        navigator: Arc<RecordingNavigator>,
        notifier: Arc<RecordingNotifier>,
        orchestrator: SessionOrchestrator,
    }

    fn ada() -> Identity {
        Identity::new("uid-1", "a@b.com", Some("Ada".into()))
    }

    fn fixture_with(store: InMemorySessionStore, validator: MockSessionValidator) -> Fixture {
        let provider = Arc::new(MockIdentityProvider::new().with_account("a@b.com", "pw", ada()));
        let store = Arc::new(store);
        let resolver = Arc::new(MockUserResolver::new().with_user("a@b.com", "U1"));
        let validator = Arc::new(validator);
        let navigator = Arc::new(RecordingNavigator::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = SessionOrchestrator::new(
            provider.clone(),
            store.clone(),
            resolver.clone(),
            validator.clone(),
            navigator.clone(),
            notifier.clone(),
        )
        .with_config(OrchestratorConfig::default().with_navigation_delay(Duration::ZERO));
        Fixture {
            provider,
            store,
            resolver,
            validator,
            navigator,
            notifier,
            orchestrator,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(InMemorySessionStore::new(), MockSessionValidator::accepting())
    }

    fn pw() -> SecretString {
        SecretString::new("pw".into())
    }

    #[tokio::test]
    async fn initial_status_reflects_stored_session() {
        let f = fixture_with(
            InMemorySessionStore::with_entries(&[
                (SessionKey::UserEmail, "a@b.com"),
                (SessionKey::IdToken, "tok"),
            ]),
            MockSessionValidator::accepting(),
        );

        assert_eq!(
            f.orchestrator.status(),
            SessionStatus::Authenticated(Completeness::Degraded)
        );
        assert_eq!(f.orchestrator.current_session().unwrap().email, "a@b.com");
    }

    #[tokio::test]
    async fn sign_in_persists_full_session_and_navigates_home() {
        let f = fixture();

        let session = f.orchestrator.sign_in_with_password("a@b.com", &pw()).await.unwrap();

        assert_eq!(session.internal_user_id.unwrap().as_str(), "U1");
        assert_eq!(f.store.get(SessionKey::UserEmail).as_deref(), Some("a@b.com"));
        assert_eq!(f.store.get(SessionKey::IdToken).as_deref(), Some("uid-1-token-1"));
        assert_eq!(f.store.get(SessionKey::UserId).as_deref(), Some("U1"));
        assert_eq!(f.store.get(SessionKey::DisplayName).as_deref(), Some("Ada"));
        assert_eq!(f.navigator.routes(), vec![Route::Home]);
        assert_eq!(
            f.orchestrator.status(),
            SessionStatus::Authenticated(Completeness::Complete)
        );
        assert_eq!(
            f.notifier.entries(),
            vec![(Severity::Success, "Signed in as a@b.com".to_string())]
        );
    }

    #[tokio::test]
    async fn bad_password_leaves_store_untouched() {
        let f = fixture();

        let result = f.orchestrator.sign_in_with_password("a@b.com", &SecretString::new("x".into())).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert!(f.store.is_empty());
        assert!(f.navigator.routes().is_empty());
        assert_eq!(f.orchestrator.status(), SessionStatus::Anonymous);
        assert_eq!(
            f.notifier.entries(),
            vec![(Severity::Failure, "Invalid email or password".to_string())]
        );
    }

    #[tokio::test]
    async fn token_failure_writes_nothing() {
        let f = fixture();
        f.provider.set_token_error(Some(AuthError::network("offline")));

        let result = f.orchestrator.sign_in_with_password("a@b.com", &pw()).await;

        assert!(matches!(result, Err(AuthError::Network(_))));
        assert!(f.store.is_empty());
        assert_eq!(f.orchestrator.status(), SessionStatus::Anonymous);
        assert_eq!(f.resolver.call_count(), 0);
    }

    #[tokio::test]
    async fn resolution_network_failure_degrades_without_failing() {
        let store = Arc::new(InMemorySessionStore::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let orchestrator = SessionOrchestrator::new(
            Arc::new(MockIdentityProvider::new().with_account("a@b.com", "pw", ada())),
            store.clone(),
            Arc::new(MockUserResolver::new().with_error(ResolutionError::Network("refused".into()))),
            Arc::new(MockSessionValidator::accepting()),
            navigator.clone(),
            Arc::new(RecordingNotifier::new()),
        )
        .with_config(OrchestratorConfig::default().with_navigation_delay(Duration::ZERO));

        let session = orchestrator.sign_in_with_password("a@b.com", &pw()).await.unwrap();

        assert!(session.is_degraded());
        assert!(store.session().unwrap().is_degraded());
        assert!(orchestrator.status().is_degraded());
        assert_eq!(navigator.routes(), vec![Route::Home]);
    }

    #[tokio::test]
    async fn rejected_validation_keeps_session_without_navigating() {
        let f = fixture_with(InMemorySessionStore::new(), MockSessionValidator::rejecting("expired"));

        let result = f.orchestrator.sign_in_with_password("a@b.com", &pw()).await;

        assert_eq!(result.unwrap_err(), AuthError::Rejected("expired".into()));
        assert!(f.navigator.routes().is_empty());
        assert!(f.store.session().is_some());
        assert_eq!(
            f.notifier.entries(),
            vec![(Severity::Failure, "expired".to_string())]
        );
        assert!(f.orchestrator.status().is_authenticated());
    }

    #[tokio::test]
    async fn cancelled_popup_is_an_info_notification() {
        let f = fixture();

        let result = f.orchestrator.sign_in_with_federated_provider().await;

        assert!(matches!(result, Err(AuthError::Cancelled)));
        assert_eq!(f.notifier.notifications().len(), 1);
        assert_eq!(f.notifier.notifications()[0].severity, Severity::Info);
    }

    #[tokio::test]
    async fn sign_out_clears_store_even_when_provider_fails() {
        let f = fixture();
        f.orchestrator.sign_in_with_password("a@b.com", &pw()).await.unwrap();
        let provider = Arc::new(
            MockIdentityProvider::new().with_sign_out_error(AuthError::network("offline")),
        );
        let orchestrator = SessionOrchestrator::new(
            provider.clone(),
            f.store.clone(),
            f.resolver.clone(),
            f.validator.clone(),
            f.navigator.clone(),
            f.notifier.clone(),
        );

        orchestrator.sign_out().await.unwrap();

        assert_eq!(provider.sign_out_calls(), 1);
        assert!(f.store.is_empty());
        assert_eq!(orchestrator.status(), SessionStatus::Anonymous);
        assert_eq!(f.navigator.routes().last(), Some(&Route::SignIn));
        assert_eq!(
            f.notifier.entries().last(),
            Some(&(Severity::Success, "Signed out".to_string()))
        );
    }

    #[tokio::test]
    async fn retry_resolution_completes_degraded_session() {
        let f = fixture_with(
            InMemorySessionStore::with_entries(&[
                (SessionKey::UserEmail, "a@b.com"),
                (SessionKey::IdToken, "tok"),
            ]),
            MockSessionValidator::accepting(),
        );

        let session = f.orchestrator.retry_resolution().await.unwrap();

        assert_eq!(session.internal_user_id.unwrap().as_str(), "U1");
        assert_eq!(f.store.get(SessionKey::UserId).as_deref(), Some("U1"));
        assert_eq!(
            f.orchestrator.status(),
            SessionStatus::Authenticated(Completeness::Complete)
        );
    }

    #[tokio::test]
    async fn retries_without_session_report_not_signed_in() {
        let f = fixture();

        assert_eq!(f.orchestrator.retry_resolution().await.unwrap_err(), AuthError::NotSignedIn);
        assert_eq!(f.orchestrator.revalidate().await.unwrap_err(), AuthError::NotSignedIn);
        assert_eq!(f.notifier.notifications().len(), 2);
        assert_eq!(f.resolver.call_count(), 0);
        assert_eq!(f.validator.call_count(), 0);
    }

    #[tokio::test]
    async fn revalidate_navigates_home_when_accepted() {
        let f = fixture_with(
            InMemorySessionStore::with_entries(&[
                (SessionKey::UserEmail, "a@b.com"),
                (SessionKey::IdToken, "tok"),
                (SessionKey::UserId, "U1"),
            ]),
            MockSessionValidator::rejecting("expired"),
        );
        assert!(f.orchestrator.revalidate().await.is_err());
        assert!(f.navigator.routes().is_empty());

        f.validator.set_answer(Ok(ValidationResult::Accepted));
        f.orchestrator.revalidate().await.unwrap();

        assert_eq!(f.navigator.routes(), vec![Route::Home]);
        assert_eq!(
            f.notifier.entries(),
            vec![
                (Severity::Failure, "expired".to_string()),
                (Severity::Success, "Session validated".to_string()),
            ]
        );
    }
}
