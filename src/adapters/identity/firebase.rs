//! Firebase Authentication adapter (Identity Toolkit REST API).
//!
//! Implements `IdentityProvider` against:
//!
//! - `POST {identity}/v1/accounts:signInWithPassword`
//! - `POST {identity}/v1/accounts:signInWithIdp` with a credential obtained
//!   from a `FederatedPrompt`
//! - `POST {token}/v1/token` (refresh token grant) for fresh id tokens
//!
//! The signed-in user lives in memory only. Sign-in state changes are
//! delivered through an unbounded channel whose receiver can be taken once.
//!
//! # Example
//!
//! ```ignore
//! let config = FirebaseConfig::new(api_key);
//! let provider = FirebaseIdentityProvider::new(config, Arc::new(prompt))?;
//! let events = provider.auth_state_changes()?;
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::adapters::backend::join_url;
use crate::domain::session::{
    AccessToken, AuthError, FederatedProvider, IdpCredential, Identity, IdentityEvent,
};
use crate::ports::{FederatedPrompt, IdentityEventStream, IdentityProvider};

/// Cached tokens this close to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Lifetime assumed when the API omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Connection settings for the Identity Toolkit API.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Web API key of the Firebase project.
    pub api_key: SecretString,

    /// Base URL of the Identity Toolkit API.
    pub identity_base_url: String,

    /// Base URL of the Secure Token API.
    pub token_base_url: String,

    /// Continue URI sent with federated sign-ins.
    pub request_uri: String,
}

impl FirebaseConfig {
    /// Configuration pointing at Google's public endpoints.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            identity_base_url: "https://identitytoolkit.googleapis.com".to_string(),
            token_base_url: "https://securetoken.googleapis.com".to_string(),
            request_uri: "http://localhost".to_string(),
        }
    }

    /// Point both APIs at another host (emulator or test server).
    pub fn with_base_urls(mut self, identity: impl Into<String>, token: impl Into<String>) -> Self {
        self.identity_base_url = identity.into();
        self.token_base_url = token.into();
        self
    }

    pub fn with_request_uri(mut self, request_uri: impl Into<String>) -> Self {
        self.request_uri = request_uri.into();
        self
    }
}

/// The user currently signed in to the provider.
struct SignedInUser {
    identity: Identity,
    id_token: SecretString,
    refresh_token: SecretString,
    expires_at: DateTime<Utc>,
}

impl SignedInUser {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordSignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpSignInRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Failure talking to the API, before mapping into `AuthError`.
#[derive(Debug)]
enum ApiError {
    /// The API answered with an error code such as `INVALID_PASSWORD`.
    Code(String),
    /// No usable answer.
    Network(String),
}

impl ApiError {
    /// Codes meaning the stored refresh token can no longer be used.
    fn revokes_session(&self) -> bool {
        matches!(
            self,
            ApiError::Code(code) if matches!(
                code.as_str(),
                "TOKEN_EXPIRED" | "USER_NOT_FOUND" | "INVALID_REFRESH_TOKEN" | "USER_DISABLED"
            )
        )
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Code(code) => match code.as_str() {
                "EMAIL_NOT_FOUND"
                | "INVALID_PASSWORD"
                | "INVALID_LOGIN_CREDENTIALS"
                | "INVALID_EMAIL"
                | "MISSING_PASSWORD"
                | "USER_DISABLED"
                | "INVALID_IDP_RESPONSE"
                | "TOKEN_EXPIRED"
                | "USER_NOT_FOUND"
                | "INVALID_REFRESH_TOKEN" => AuthError::InvalidCredentials,
                other => AuthError::Network(other.to_string()),
            },
            ApiError::Network(message) => AuthError::Network(message),
        }
    }
}

/// Parses `expiresIn` ("3600") into an absolute expiry.
fn expiry_from(expires_in: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let secs = expires_in
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    now + Duration::seconds(secs)
}

// ════════════════════════════════════════════════════════════════════════════════
// Provider
// ════════════════════════════════════════════════════════════════════════════════

/// `IdentityProvider` backed by Firebase Authentication.
pub struct FirebaseIdentityProvider {
    http: reqwest::Client,
    config: FirebaseConfig,
    prompt: Arc<dyn FederatedPrompt>,
    current: RwLock<Option<SignedInUser>>,
    events: mpsc::UnboundedSender<IdentityEvent>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<IdentityEvent>>>,
}

impl FirebaseIdentityProvider {
    pub fn new(config: FirebaseConfig, prompt: Arc<dyn FederatedPrompt>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        let (events, receiver) = mpsc::unbounded_channel();
        Ok(Self {
            http,
            config,
            prompt,
            current: RwLock::new(None),
            events,
            receiver: Mutex::new(Some(receiver)),
        })
    }

    fn identity_url(&self, method: &str) -> String {
        join_url(&self.config.identity_base_url, &format!("v1/accounts:{}", method))
    }

    fn token_url(&self) -> String {
        join_url(&self.config.token_base_url, "v1/token")
    }

    fn emit(&self, event: IdentityEvent) {
        // No receiver means nobody is listening; the change still happened.
        if self.events.send(event).is_err() {
            tracing::debug!("Identity event dropped, no subscriber");
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .query(&[("key", self.config.api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Network(format!("invalid response: {}", e)));
        }

        if status.is_client_error() {
            if let Ok(envelope) = response.json::<ErrorEnvelope>().await {
                // Messages look like "TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled..."
                let code = envelope
                    .error
                    .message
                    .split(" : ")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                return Err(ApiError::Code(code));
            }
        }

        Err(ApiError::Network(format!("identity API returned {}", status)))
    }

    /// Records a completed sign-in for `email` and announces it.
    async fn complete_sign_in(&self, response: SignInResponse, email: String) -> Identity {
        let now = Utc::now();
        let identity = Identity::new(
            response.local_id,
            email,
            response.display_name.filter(|name| !name.is_empty()),
        );
        let user = SignedInUser {
            identity: identity.clone(),
            id_token: SecretString::new(response.id_token),
            refresh_token: SecretString::new(response.refresh_token),
            expires_at: expiry_from(response.expires_in.as_deref(), now),
        };

        *self.current.write().await = Some(user);
        tracing::info!(uid = %identity.uid, "Signed in to identity provider");
        self.emit(IdentityEvent::SignedIn(identity.clone()));
        identity
    }

    async fn refresh(&self, uid: &str, refresh_token: &SecretString) -> Result<AccessToken, AuthError> {
        let request = self.http.post(self.token_url()).form(&RefreshRequest {
            grant_type: "refresh_token",
            refresh_token: refresh_token.expose_secret(),
        });

        match self.send::<RefreshResponse>(request).await {
            Ok(response) => {
                let token = AccessToken::new(response.id_token.clone());
                let mut current = self.current.write().await;
                // Only store the result if the same user is still signed in.
                if let Some(user) = current.as_mut().filter(|u| u.identity.uid == uid) {
                    user.id_token = SecretString::new(response.id_token);
                    user.refresh_token = SecretString::new(response.refresh_token);
                    user.expires_at = expiry_from(response.expires_in.as_deref(), Utc::now());
                }
                Ok(token)
            }
            Err(err) if err.revokes_session() => {
                tracing::warn!(uid = %uid, error = ?err, "Refresh token revoked, signing out");
                let mut current = self.current.write().await;
                if current.as_ref().is_some_and(|u| u.identity.uid == uid) {
                    *current = None;
                    drop(current);
                    self.emit(IdentityEvent::SignedOut);
                }
                Err(err.into())
            }
            Err(err) => {
                tracing::warn!(uid = %uid, error = ?err, "Token refresh failed");
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError> {
        let request = self
            .http
            .post(self.identity_url("signInWithPassword"))
            .json(&PasswordSignInRequest {
                email,
                password: password.expose_secret(),
                return_secure_token: true,
            });

        let response = self.send::<SignInResponse>(request).await.map_err(|e| {
            tracing::debug!(error = ?e, "Password sign-in failed");
            AuthError::from(e)
        })?;

        let email = response
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| email.to_string());
        Ok(self.complete_sign_in(response, email).await)
    }

    async fn sign_in_with_popup(&self, provider: &FederatedProvider) -> Result<Identity, AuthError> {
        let credential = self
            .prompt
            .prompt(provider)
            .await
            .ok_or(AuthError::Cancelled)?;

        let token_field = match &credential {
            IdpCredential::IdToken(token) => format!("id_token={}", token.expose_secret()),
            IdpCredential::AccessToken(token) => format!("access_token={}", token.expose_secret()),
        };
        let request = self
            .http
            .post(self.identity_url("signInWithIdp"))
            .json(&IdpSignInRequest {
                post_body: format!("{}&providerId={}", token_field, provider.provider_id()),
                request_uri: &self.config.request_uri,
                return_secure_token: true,
                return_idp_credential: true,
            });

        let response = self.send::<SignInResponse>(request).await.map_err(|e| {
            tracing::debug!(provider = %provider, error = ?e, "Federated sign-in failed");
            AuthError::from(e)
        })?;

        // Accounts without an email cannot hold a session; leave them signed out.
        let Some(email) = response.email.clone().filter(|e| !e.trim().is_empty()) else {
            tracing::warn!(provider = %provider, uid = %response.local_id, "Federated account has no email");
            return Err(AuthError::MissingEmail);
        };
        Ok(self.complete_sign_in(response, email).await)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.current.write().await.take();
        if let Some(user) = previous {
            tracing::info!(uid = %user.identity.uid, "Signed out of identity provider");
        }
        self.emit(IdentityEvent::SignedOut);
        Ok(())
    }

    async fn get_id_token(&self, force_refresh: bool) -> Result<AccessToken, AuthError> {
        let (uid, refresh_token) = {
            let current = self.current.read().await;
            let user = current.as_ref().ok_or(AuthError::NotSignedIn)?;
            if !force_refresh && user.is_fresh(Utc::now()) {
                return Ok(AccessToken::new(user.id_token.expose_secret().clone()));
            }
            (user.identity.uid.clone(), user.refresh_token.clone())
        };

        self.refresh(&uid, &refresh_token).await
    }

    fn auth_state_changes(&self) -> Result<IdentityEventStream, AuthError> {
        let receiver = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(AuthError::AlreadySubscribed)?;
        Ok(UnboundedReceiverStream::new(receiver).boxed())
    }
}
