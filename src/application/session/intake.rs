//! Echo bookkeeping for explicit sign-ins and sign-outs.
//!
//! The identity provider announces every successful sign-in and sign-out
//! on its event stream, including the ones the orchestrator asked for
//! itself. The event listener consumes recorded echoes instead of starting
//! a second pipeline run.
//!
//! The intake lock is never held while the provider is answering, since a
//! federated sign-in can wait on the user indefinitely. Instead an explicit
//! sign-in takes a [`Ticket`] before calling the provider and settles it
//! afterwards. While any ticket is outstanding, `SignedIn` events that
//! match no recorded echo are held back: one of them may be the echo of
//! the sign-in still in flight. Held events are released once no sign-in
//! is outstanding, unless a later explicit sign-in or a sign-out has made
//! them stale.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

use crate::domain::session::{Identity, IdentityEvent};

#[derive(Debug)]
pub(super) struct Ticket {
    sign_outs: u64,
}

/// An explicit sign-in in flight.
///
/// Dropped without `settle` (the caller gave up mid-call), it settles
/// itself as failed on the runtime so held events are not kept forever.
pub(super) struct PendingSignIn {
    intake: Arc<Mutex<Intake>>,
    released: Arc<Notify>,
    ticket: Option<Ticket>,
}

impl PendingSignIn {
    pub(super) async fn begin(intake: &Arc<Mutex<Intake>>, released: &Arc<Notify>) -> Self {
        let ticket = intake.lock().await.begin_sign_in();
        Self {
            intake: Arc::clone(intake),
            released: Arc::clone(released),
            ticket: Some(ticket),
        }
    }

    /// Settles with the provider's answer; `intake` is the locked intake.
    /// Returns true when an explicit sign-out ran in the meantime.
    pub(super) fn settle(mut self, intake: &mut Intake, identity: Option<&Identity>) -> bool {
        let overtaken = match self.ticket.take() {
            Some(ticket) => intake.settle_sign_in(ticket, identity),
            None => false,
        };
        if intake.releasable() {
            self.released.notify_one();
        }
        overtaken
    }
}

impl Drop for PendingSignIn {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        let intake = Arc::clone(&self.intake);
        let released = Arc::clone(&self.released);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let mut intake = intake.lock().await;
                    intake.settle_sign_in(ticket, None);
                    if intake.releasable() {
                        released.notify_one();
                    }
                });
            }
            Err(_) => tracing::warn!("Abandoned sign-in could not be settled outside a runtime"),
        }
    }
}

#[derive(Debug)]
struct Held {
    identity: Identity,
    // Explicit sign-ins settled when this event arrived.
    settled: u64,
}

#[derive(Debug, Default)]
pub(super) struct Intake {
    signed_in: HashMap<String, usize>,
    signed_out: usize,
    outstanding: usize,
    settled: u64,
    sign_outs: u64,
    held: Vec<Held>,
}

impl Intake {
    fn expect_signed_in(&mut self, uid: &str) {
        *self.signed_in.entry(uid.to_string()).or_default() += 1;
    }

    pub(super) fn expect_signed_out(&mut self) {
        self.signed_out += 1;
    }

    /// Registers an explicit sign-in about to call the provider.
    fn begin_sign_in(&mut self) -> Ticket {
        self.outstanding += 1;
        Ticket {
            sign_outs: self.sign_outs,
        }
    }

    /// Settles `ticket` with the provider's answer.
    ///
    /// A successful sign-in consumes its echo if it was already held, or
    /// records it for the listener. Returns true when an explicit sign-out
    /// ran while the provider was answering.
    fn settle_sign_in(&mut self, ticket: Ticket, identity: Option<&Identity>) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);
        if let Some(identity) = identity {
            self.settled += 1;
            match self.held.iter().position(|h| h.identity.uid == identity.uid) {
                Some(index) => {
                    self.held.remove(index);
                }
                None => self.expect_signed_in(&identity.uid),
            }
        }
        ticket.sign_outs != self.sign_outs
    }

    /// Records an explicit sign-out. Held sign-ins predate it and are dropped.
    pub(super) fn begin_sign_out(&mut self) {
        self.sign_outs += 1;
        self.discard_held();
    }

    /// Drops every held sign-in.
    pub(super) fn discard_held(&mut self) {
        if !self.held.is_empty() {
            tracing::debug!(count = self.held.len(), "Dropping held sign-in events");
            self.held.clear();
        }
    }

    /// Returns true, and forgets the echo, if `event` was expected.
    pub(super) fn take_echo(&mut self, event: &IdentityEvent) -> bool {
        match event {
            IdentityEvent::SignedIn(identity) => match self.signed_in.get_mut(&identity.uid) {
                Some(pending) => {
                    *pending -= 1;
                    if *pending == 0 {
                        self.signed_in.remove(&identity.uid);
                    }
                    true
                }
                None => false,
            },
            IdentityEvent::SignedOut if self.signed_out > 0 => {
                self.signed_out -= 1;
                true
            }
            IdentityEvent::SignedOut => false,
        }
    }

    /// Holds a `SignedIn` back while an explicit sign-in is outstanding.
    /// Returns false when nothing is outstanding and the event should run.
    pub(super) fn hold(&mut self, identity: &Identity) -> bool {
        if self.outstanding == 0 {
            return false;
        }
        self.held.push(Held {
            identity: identity.clone(),
            settled: self.settled,
        });
        true
    }

    /// True when held events are waiting and nothing is outstanding.
    pub(super) fn releasable(&self) -> bool {
        self.outstanding == 0 && !self.held.is_empty()
    }

    /// Takes the newest held sign-in that is still current, once no
    /// explicit sign-in is outstanding. Older held events are dropped.
    pub(super) fn release(&mut self) -> Option<Identity> {
        if self.outstanding > 0 {
            return None;
        }
        let settled = self.settled;
        let held = std::mem::take(&mut self.held);
        let total = held.len();
        let newest = held
            .into_iter()
            .filter(|h| h.settled == settled)
            .last()
            .map(|h| h.identity);
        if total > usize::from(newest.is_some()) {
            tracing::debug!(
                dropped = total - usize::from(newest.is_some()),
                "Dropping stale held sign-in events"
            );
        }
        newest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(uid: &str) -> Identity {
        Identity::new(uid, format!("{}@b.com", uid), None)
    }

    fn signed_in(uid: &str) -> IdentityEvent {
        IdentityEvent::SignedIn(identity(uid))
    }

    #[test]
    fn unexpected_events_are_not_echoes() {
        let mut intake = Intake::default();
        assert!(!intake.take_echo(&signed_in("a")));
        assert!(!intake.take_echo(&IdentityEvent::SignedOut));
    }

    #[test]
    fn echo_after_settling_is_consumed_once() {
        let mut intake = Intake::default();
        let ticket = intake.begin_sign_in();
        assert!(!intake.settle_sign_in(ticket, Some(&identity("a"))));

        assert!(!intake.take_echo(&signed_in("b")));
        assert!(intake.take_echo(&signed_in("a")));
        assert!(!intake.take_echo(&signed_in("a")));
    }

    #[test]
    fn echo_before_settling_is_held_then_consumed() {
        let mut intake = Intake::default();
        let ticket = intake.begin_sign_in();

        assert!(!intake.take_echo(&signed_in("a")));
        assert!(intake.hold(&identity("a")));
        intake.settle_sign_in(ticket, Some(&identity("a")));

        assert!(!intake.releasable());
        assert_eq!(intake.release(), None);
        // Nothing left to skip later.
        assert!(!intake.take_echo(&signed_in("a")));
    }

    #[test]
    fn nothing_is_held_without_an_outstanding_sign_in() {
        let mut intake = Intake::default();
        assert!(!intake.hold(&identity("a")));
    }

    #[test]
    fn held_event_runs_after_failed_sign_in() {
        let mut intake = Intake::default();
        let ticket = intake.begin_sign_in();
        intake.hold(&identity("bg"));

        intake.settle_sign_in(ticket, None);

        assert!(intake.releasable());
        assert_eq!(intake.release(), Some(identity("bg")));
        assert!(!intake.releasable());
    }

    #[test]
    fn held_event_is_stale_after_successful_sign_in() {
        let mut intake = Intake::default();
        let ticket = intake.begin_sign_in();
        intake.hold(&identity("bg"));
        intake.hold(&identity("a"));

        intake.settle_sign_in(ticket, Some(&identity("a")));

        assert!(intake.releasable());
        assert_eq!(intake.release(), None);
    }

    #[test]
    fn sign_out_overtakes_outstanding_sign_in() {
        let mut intake = Intake::default();
        let ticket = intake.begin_sign_in();
        intake.hold(&identity("bg"));

        intake.begin_sign_out();

        assert!(!intake.releasable());
        assert!(intake.settle_sign_in(ticket, Some(&identity("a"))));
        // The overtaken sign-in's echo is still skipped.
        assert!(intake.take_echo(&signed_in("a")));
    }

    #[tokio::test]
    async fn abandoned_sign_in_stops_holding_events() {
        let intake = Arc::new(Mutex::new(Intake::default()));
        let released = Arc::new(Notify::new());

        let pending = PendingSignIn::begin(&intake, &released).await;
        assert!(intake.lock().await.hold(&identity("bg")));
        drop(pending);

        released.notified().await;
        assert_eq!(intake.lock().await.release(), Some(identity("bg")));
    }

    #[test]
    fn signed_out_echoes_are_counted() {
        let mut intake = Intake::default();
        intake.expect_signed_out();

        assert!(intake.take_echo(&IdentityEvent::SignedOut));
        assert!(!intake.take_echo(&IdentityEvent::SignedOut));
    }
}
