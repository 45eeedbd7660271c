//! HTTP session validator.
//!
//! Calls `GET {auth_base_url}/validate` with the stored bearer token.
//! The endpoint answers `{ "success": bool, "message": string? }`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::client::{join_url, BackendClient};
use crate::domain::session::{ValidationError, ValidationResult};
use crate::ports::SessionValidator;

/// Shown when the backend refuses without saying why.
const DEFAULT_REJECTION: &str = "Authentication Failed";

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// `SessionValidator` backed by the LMS auth service.
#[derive(Debug, Clone)]
pub struct HttpSessionValidator {
    client: BackendClient,
    url: String,
}

impl HttpSessionValidator {
    pub fn new(client: BackendClient, auth_base_url: &str) -> Self {
        Self {
            client,
            url: join_url(auth_base_url, "validate"),
        }
    }
}

#[async_trait]
impl SessionValidator for HttpSessionValidator {
    async fn validate(&self) -> Result<ValidationResult, ValidationError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            tracing::warn!(error = %e, "Validate request failed");
            ValidationError::Network(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let reason = response
                .json::<ValidateResponse>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| DEFAULT_REJECTION.to_string());
            tracing::debug!(%status, "Backend refused the session");
            return Ok(ValidationResult::Rejected(reason));
        }

        if !status.is_success() {
            tracing::warn!(%status, "Validate endpoint returned an error");
            return Err(ValidationError::Network(format!(
                "validate endpoint returned {}",
                status
            )));
        }

        let body: ValidateResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse validate response");
            ValidationError::Network(format!("invalid validate response: {}", e))
        })?;

        if body.success {
            Ok(ValidationResult::Accepted)
        } else {
            Ok(ValidationResult::Rejected(
                body.message.unwrap_or_else(|| DEFAULT_REJECTION.to_string()),
            ))
        }
    }
}
