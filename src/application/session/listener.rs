//! The identity event listener.
//!
//! One consumer task owns the provider's event stream. `SignedIn` events
//! the orchestrator did not ask for start a background pipeline run in a
//! `JoinSet`; `SignedOut` events end the local session. Echoes of explicit
//! operations are skipped. A `SignedIn` that arrives while an explicit
//! sign-in is still waiting on the provider is held until that sign-in
//! settles. The task stops when its cancellation token fires or the stream
//! ends.

use std::sync::Arc;

use futures::StreamExt;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use super::orchestrator::{SessionOrchestrator, Trigger};
use crate::domain::session::{AuthError, Identity, IdentityEvent};

/// Owns the running listener.
#[derive(Debug)]
pub struct OrchestratorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl OrchestratorHandle {
    /// Token that stops the listener when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the listener, aborting background runs still in flight, and
    /// waits for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "Identity listener ended abnormally");
        }
    }
}

impl SessionOrchestrator {
    /// Takes the provider's event stream and starts the listener.
    ///
    /// Fails with `AuthError::AlreadySubscribed` if the stream was taken
    /// before, including by an earlier `start`.
    pub fn start(self: &Arc<Self>) -> Result<OrchestratorHandle, AuthError> {
        let mut events = self.provider().auth_state_changes()?;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let orchestrator = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut runs = JoinSet::new();
            tracing::debug!("Identity listener started");

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!(in_flight = runs.len(), "Identity listener cancelled");
                        runs.shutdown().await;
                        return;
                    }

                    _ = orchestrator.released.notified() => {
                        orchestrator.run_released(&mut runs).await;
                    }

                    Some(joined) = runs.join_next(), if !runs.is_empty() => {
                        if let Err(err) = joined {
                            tracing::error!(error = %err, "Background session run panicked");
                        }
                    }

                    event = events.next() => match event {
                        Some(event) => orchestrator.handle_event(event, &mut runs).await,
                        None => {
                            tracing::debug!("Identity event stream closed");
                            break;
                        }
                    },
                }
            }

            while let Some(joined) = runs.join_next().await {
                if let Err(err) = joined {
                    tracing::error!(error = %err, "Background session run panicked");
                }
            }
        });

        Ok(OrchestratorHandle { cancel, task })
    }

    async fn handle_event(self: &Arc<Self>, event: IdentityEvent, runs: &mut JoinSet<()>) {
        // Nobody observing is fine.
        let _ = self.identity_events.send(event.clone());

        let mut intake = self.intake.lock().await;
        if intake.take_echo(&event) {
            tracing::debug!(event = ?event, "Skipping echo of explicit operation");
            return;
        }

        match event {
            IdentityEvent::SignedIn(identity) => {
                if intake.hold(&identity) {
                    tracing::debug!(uid = %identity.uid, "Holding sign-in until explicit sign-in settles");
                    return;
                }
                tracing::info!(uid = %identity.uid, "Provider reported sign-in");
                self.spawn_background_run(identity, runs).await;
            }
            IdentityEvent::SignedOut => {
                tracing::info!("Provider reported sign-out");
                intake.discard_held();
                self.end_session_in_background().await;
            }
        }
    }

    /// Runs the sign-in held back while explicit sign-ins were outstanding.
    async fn run_released(self: &Arc<Self>, runs: &mut JoinSet<()>) {
        let mut intake = self.intake.lock().await;
        if let Some(identity) = intake.release() {
            tracing::info!(uid = %identity.uid, "Provider reported sign-in (held)");
            self.spawn_background_run(identity, runs).await;
        }
    }

    /// Starts a background run. Callers hold the intake lock.
    async fn spawn_background_run(self: &Arc<Self>, identity: Identity, runs: &mut JoinSet<()>) {
        if !identity.has_email() {
            tracing::warn!(uid = %identity.uid, "Ignoring sign-in of an account without email");
            return;
        }
        let generation = self.begin_run().await;

        let orchestrator = Arc::clone(self);
        runs.spawn(async move {
            // Outcome is logged by finish_run; background runs never notify.
            let _ = orchestrator
                .finish_run(generation, &identity, Trigger::Background)
                .await;
        });
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
    use crate::application::session::OrchestratorConfig;
    use crate::domain::session::{Identity, Route, SessionKey, SessionStatus};
    use crate::ports::SessionStore;
    use std::time::Duration;

    fn build(
        provider: Arc<MockIdentityProvider>,
        store: Arc<InMemorySessionStore>,
        navigator: Arc<RecordingNavigator>,
        notifier: Arc<RecordingNotifier>,
    ) -> Arc<SessionOrchestrator> {
        Arc::new(
            SessionOrchestrator::new(
                provider,
                store,
                Arc::new(MockUserResolver::new().with_user("a@b.com", "U1")),
                Arc::new(MockSessionValidator::accepting()),
                navigator,
                notifier,
            )
            .with_config(OrchestratorConfig::default().with_navigation_delay(Duration::ZERO)),
        )
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let orchestrator = build(
            Arc::new(MockIdentityProvider::new()),
            Arc::new(InMemorySessionStore::new()),
            Arc::new(RecordingNavigator::new()),
            Arc::new(RecordingNotifier::new()),
        );

        let handle = orchestrator.start().unwrap();

        assert!(matches!(orchestrator.start(), Err(AuthError::AlreadySubscribed)));
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn background_sign_in_runs_pipeline_without_notifying() {
        let provider = Arc::new(MockIdentityProvider::new());
        let store = Arc::new(InMemorySessionStore::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = build(provider.clone(), store.clone(), navigator.clone(), notifier.clone());
        let handle = orchestrator.start().unwrap();

        provider.emit(IdentityEvent::SignedIn(Identity::new("uid-1", "a@b.com", None)));
        navigator.wait_for(1).await;

        assert_eq!(store.get(SessionKey::UserId).as_deref(), Some("U1"));
        assert_eq!(navigator.routes(), vec![Route::Home]);
        assert!(notifier.notifications().is_empty());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn background_sign_out_clears_session() {
        let provider = Arc::new(MockIdentityProvider::new());
        let store = Arc::new(InMemorySessionStore::with_entries(&[
            (SessionKey::UserEmail, "a@b.com"),
            (SessionKey::IdToken, "tok"),
        ]));
        let navigator = Arc::new(RecordingNavigator::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = build(provider.clone(), store.clone(), navigator.clone(), notifier.clone());
        let mut status = orchestrator.watch_status();
        let handle = orchestrator.start().unwrap();

        provider.emit(IdentityEvent::SignedOut);
        status
            .wait_for(|s| *s == SessionStatus::Anonymous)
            .await
            .unwrap();
        navigator.wait_for(1).await;

        assert!(store.is_empty());
        assert_eq!(navigator.routes(), vec![Route::SignIn]);
        assert!(notifier.notifications().is_empty());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn explicit_sign_in_echo_does_not_start_second_run() {
        let provider = Arc::new(
            MockIdentityProvider::new().with_account(
                "a@b.com",
                "pw",
                Identity::new("uid-1", "a@b.com", None),
            ),
        );
        let navigator = Arc::new(RecordingNavigator::new());
        let orchestrator = build(
            provider.clone(),
            Arc::new(InMemorySessionStore::new()),
            navigator.clone(),
            Arc::new(RecordingNotifier::new()),
        );
        let mut observed = orchestrator.observe_identity();
        let handle = orchestrator.start().unwrap();

        orchestrator
            .sign_in_with_password("a@b.com", &secrecy::SecretString::new("pw".into()))
            .await
            .unwrap();
        // The echo has been seen by the listener once it is re-broadcast.
        assert!(matches!(observed.next().await, Some(IdentityEvent::SignedIn(_))));
        // Give a (wrong) second run the chance to navigate.
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(navigator.routes(), vec![Route::Home]);
        handle.shutdown().await;
    }
}
