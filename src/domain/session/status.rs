//! Per-process authentication state.

use serde::Serialize;

use super::Session;
use crate::domain::foundation::StateMachine;

/// Whether an authenticated session has its internal user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Completeness {
    /// Internal user id unresolved. Stable; retry is caller-driven.
    Degraded,
    Complete,
}

/// Authentication state of this client process.
///
/// ```text
/// Anonymous -> Authenticating -> Authenticated(degraded|complete) -> Anonymous
///                   |
///                   +-> Anonymous (sign-in failure)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "completeness")]
pub enum SessionStatus {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Completeness),
}

impl SessionStatus {
    /// The status implied by what is in the session store.
    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            None => SessionStatus::Anonymous,
            Some(s) if s.is_degraded() => SessionStatus::Authenticated(Completeness::Degraded),
            Some(_) => SessionStatus::Authenticated(Completeness::Complete),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SessionStatus::Authenticated(Completeness::Degraded))
    }
}

impl StateMachine for SessionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use Completeness::*;
        use SessionStatus::*;
        matches!(
            (self, target),
            (Anonymous, Authenticating)
                // A newer run may restart authentication mid-flight.
                | (Authenticating, _)
                | (Authenticated(_), Authenticating)
                | (Authenticated(_), Anonymous)
                | (Authenticated(Degraded), Authenticated(Complete))
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use Completeness::*;
        use SessionStatus::*;
        match self {
            Anonymous => vec![Authenticating],
            Authenticating => vec![
                Anonymous,
                Authenticating,
                Authenticated(Degraded),
                Authenticated(Complete),
            ],
            Authenticated(Degraded) => vec![Authenticating, Anonymous, Authenticated(Complete)],
            Authenticated(Complete) => vec![Authenticating, Anonymous],
        }
    }
}
