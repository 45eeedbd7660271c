//! Federated prompt that reads the credential from a line of input.
//!
//! The command-line client has no popup. The operator completes the
//! provider's consent flow elsewhere and pastes the resulting id token.

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

use crate::domain::session::{FederatedProvider, IdpCredential};
use crate::ports::FederatedPrompt;

/// Reads one id token per prompt from `input`.
///
/// An empty line or end of input counts as the user closing the popup.
pub struct LinePrompt<R> {
    input: Mutex<R>,
}

impl LinePrompt<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> LinePrompt<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

#[async_trait]
impl<R> FederatedPrompt for LinePrompt<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn prompt(&self, provider: &FederatedProvider) -> Option<IdpCredential> {
        tracing::info!(provider = %provider, "Waiting for federated id token on input");
        let mut line = String::new();
        let mut input = self.input.lock().await;
        match input.read_line(&mut line).await {
            Ok(_) => {
                let token = line.trim();
                (!token.is_empty()).then(|| IdpCredential::IdToken(SecretString::new(token.to_string())))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read federated credential");
                None
            }
        }
    }
}
