//! Classroom shim user search.
//!
//! Resolves an email through
//! `GET {shim_base_url}/user/search/email?email=<email>`, which answers
//! `{ "data": [{ "user_id": "...", ... }] }`. The first match wins.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::client::{join_url, BackendClient};
use crate::domain::foundation::UserId;
use crate::ports::{ResolutionError, UserResolver};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<UserRecord>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    user_id: String,
}

/// `UserResolver` backed by the classroom shim.
#[derive(Debug, Clone)]
pub struct ShimUserResolver {
    client: BackendClient,
    url: String,
}

impl ShimUserResolver {
    pub fn new(client: BackendClient, shim_base_url: &str) -> Self {
        Self {
            client,
            url: join_url(shim_base_url, "user/search/email"),
        }
    }
}

#[async_trait]
impl UserResolver for ShimUserResolver {
    async fn resolve_user_id(&self, email: &str) -> Result<UserId, ResolutionError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| ResolutionError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolutionError::NotFound);
        }
        if !status.is_success() {
            return Err(ResolutionError::Network(format!(
                "user search returned {}",
                status
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ResolutionError::InvalidResponse(e.to_string()))?;

        let first = body.data.into_iter().next().ok_or(ResolutionError::NotFound)?;
        UserId::new(first.user_id).map_err(|e| ResolutionError::InvalidResponse(e.to_string()))
    }
}
