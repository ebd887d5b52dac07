//! Client for the credit-accounting collaborator.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};

/// Result of the pre-flight chat gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChatGate {
    pub can_chat: bool,
    pub credits: i64,
}

/// Result of a post-turn credit deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Deduction {
    pub current_credits: i64,
    pub deducted: i64,
}

#[derive(Debug, Clone, Serialize)]
struct DeductRequest<'a> {
    total_tokens: u64,
    session_id: &'a str,
}

#[derive(Debug, Clone)]
pub struct CreditsClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CreditsClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Ask whether the user has enough credits to start a turn.
    pub async fn can_chat(&self, user_id: &str) -> Result<ChatGate> {
        let url = format!("{}/api/credits/{user_id}/can-chat", self.base_url);

        trace!(%url, "Checking chat gate.");
        let response = self.http_client.get(&url).send().await?;
        let response = check_status(response).await?;

        Ok(response.json().await?)
    }

    /// Deduct credits for the tokens consumed by a finished turn.
    pub async fn deduct_tokens(
        &self,
        user_id: &str,
        total_tokens: u64,
        session_id: &str,
    ) -> Result<Deduction> {
        let url = format!("{}/api/credits/{user_id}/deduct-tokens", self.base_url);

        trace!(%url, total_tokens, "Deducting tokens.");
        let response = self
            .http_client
            .post(&url)
            .json(&DeductRequest {
                total_tokens,
                session_id,
            })
            .send()
            .await?;
        let response = check_status(response).await?;

        Ok(response.json().await?)
    }
}

/// Map a non-2xx response to [`Error::Api`], keeping the body as message.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_owned()
    } else {
        body
    };

    Err(Error::Api { code, message })
}
