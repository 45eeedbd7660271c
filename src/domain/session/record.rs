//! The persisted session and its storage keys.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use crate::domain::foundation::UserId;

/// Keys under which the session is persisted.
///
/// The string forms are the storage keys the admin client has always
/// used, so existing stores keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKey {
    /// Provider-verified email (`userEmail`).
    UserEmail,
    /// Bearer token for backend calls (`idToken`).
    IdToken,
    /// Backend-issued internal user id (`userId`).
    UserId,
    /// Display name, informational only (`user`).
    DisplayName,
}

impl SessionKey {
    /// Every key, in the order they are cleared.
    pub const ALL: [SessionKey; 4] = [
        SessionKey::IdToken,
        SessionKey::UserId,
        SessionKey::DisplayName,
        SessionKey::UserEmail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::UserEmail => "userEmail",
            SessionKey::IdToken => "idToken",
            SessionKey::UserId => "userId",
            SessionKey::DisplayName => "user",
        }
    }

    /// Parses a storage key; unknown keys are ignored by stores.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "userEmail" => Some(SessionKey::UserEmail),
            "idToken" => Some(SessionKey::IdToken),
            "userId" => Some(SessionKey::UserId),
            "user" => Some(SessionKey::DisplayName),
            _ => None,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short-lived bearer credential for backend calls.
///
/// Wrapped so it never ends up in logs through `Debug`.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::new(token.into()))
    }

    /// The raw token, for building an `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

// Test-only equality so results carrying a token can be compared in assertions.
#[cfg(test)]
impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// The authenticated state of this client.
///
/// A `Session` only exists when both the email and the access token are
/// stored; a token without its email is never treated as a session.
#[derive(Debug, Clone)]
pub struct Session {
    pub email: String,
    pub access_token: AccessToken,
    /// Resolved lazily; `None` means degraded, not unauthenticated.
    pub internal_user_id: Option<UserId>,
    pub display_name: Option<String>,
}

impl Session {
    /// Builds a session from stored values.
    ///
    /// Returns `None` unless both `userEmail` and `idToken` are present
    /// and non-empty. An unparseable `userId` is treated as absent.
    pub fn from_entries<F>(get: F) -> Option<Self>
    where
        F: Fn(SessionKey) -> Option<String>,
    {
        let email = get(SessionKey::UserEmail).filter(|v| !v.is_empty())?;
        let token = get(SessionKey::IdToken).filter(|v| !v.is_empty())?;
        Some(Self {
            email,
            access_token: AccessToken::new(token),
            internal_user_id: get(SessionKey::UserId).and_then(|id| UserId::new(id).ok()),
            display_name: get(SessionKey::DisplayName),
        })
    }

    /// True when the internal user id has not been resolved yet.
    pub fn is_degraded(&self) -> bool {
        self.internal_user_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn entries(pairs: &[(SessionKey, &str)]) -> HashMap<SessionKey, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn session_requires_email_and_token() {
        let only_token = entries(&[(SessionKey::IdToken, "tok")]);
        assert!(Session::from_entries(|k| only_token.get(&k).cloned()).is_none());

        let only_email = entries(&[(SessionKey::UserEmail, "a@b.com")]);
        assert!(Session::from_entries(|k| only_email.get(&k).cloned()).is_none());
    }

    #[test]
    fn session_without_user_id_is_degraded() {
        let map = entries(&[(SessionKey::UserEmail, "a@b.com"), (SessionKey::IdToken, "tok")]);
        let session = Session::from_entries(|k| map.get(&k).cloned()).unwrap();
        assert_eq!(session.email, "a@b.com");
        assert_eq!(session.access_token.expose(), "tok");
        assert!(session.is_degraded());
    }

    #[test]
    fn session_with_user_id_is_complete() {
        let map = entries(&[
            (SessionKey::UserEmail, "a@b.com"),
            (SessionKey::IdToken, "tok"),
            (SessionKey::UserId, "U1"),
            (SessionKey::DisplayName, "Ada"),
        ]);
        let session = Session::from_entries(|k| map.get(&k).cloned()).unwrap();
        assert_eq!(session.internal_user_id.unwrap().as_str(), "U1");
        assert_eq!(session.display_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("secret-token");
        assert!(!format!("{:?}", token).contains("secret-token"));
    }

    #[test]
    fn session_keys_round_trip_through_storage_names() {
        for key in SessionKey::ALL {
            assert_eq!(SessionKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SessionKey::DisplayName.as_str(), "user");
        assert_eq!(SessionKey::parse("unknown"), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn session_exists_iff_email_and_token_are_non_empty(
                email in proptest::option::of("[a-z@.]{0,8}"),
                token in proptest::option::of("[a-z0-9-]{0,8}"),
                user_id in proptest::option::of("[A-Z0-9]{0,4}"),
            ) {
                let mut map = HashMap::new();
                if let Some(email) = &email {
                    map.insert(SessionKey::UserEmail, email.clone());
                }
                if let Some(token) = &token {
                    map.insert(SessionKey::IdToken, token.clone());
                }
                if let Some(user_id) = &user_id {
                    map.insert(SessionKey::UserId, user_id.clone());
                }

                let session = Session::from_entries(|k| map.get(&k).cloned());
                let expected = email.as_deref().is_some_and(|e| !e.is_empty())
                    && token.as_deref().is_some_and(|t| !t.is_empty());

                prop_assert_eq!(session.is_some(), expected);
            }
        }
    }
}
