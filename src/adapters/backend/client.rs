//! Authorized HTTP client for backend calls.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::session::SessionKey;
use crate::ports::SessionStore;

/// HTTP client that reads the bearer token from the session store.
///
/// The token is read at request time, so a refresh written by the
/// orchestrator is picked up by the next call without rebuilding the
/// client. A request built while a refresh is in flight may carry the
/// previous token.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    store: Arc<dyn SessionStore>,
}

impl BackendClient {
    /// Create a client. `timeout` of `None` leaves requests unbounded.
    pub fn new(store: Arc<dyn SessionStore>, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            store,
        })
    }

    /// Start a GET request, authorized when a token is stored.
    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(url);
        match self.store.get(SessionKey::IdToken) {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient").finish_non_exhaustive()
    }
}

/// Join a base URL and a path with exactly one slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionStore;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(join_url("http://x/api/", "/validate"), "http://x/api/validate");
        assert_eq!(join_url("http://x/api", "validate"), "http://x/api/validate");
    }

    #[tokio::test]
    async fn attaches_bearer_token_from_store() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(InMemorySessionStore::with_entries(&[(SessionKey::IdToken, "tok-1")]));
        let client = BackendClient::new(store, None).unwrap();

        let response = client
            .get(&format!("{}/ping", server.uri()))
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = BackendClient::new(Arc::new(InMemorySessionStore::new()), None).unwrap();

        let response = client.get(&server.uri()).send().await.unwrap();

        assert_eq!(response.status().as_u16(), 204);
    }
}
