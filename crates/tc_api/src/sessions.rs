//! Client for the session-directory collaborator.

use serde::Deserialize;
use tracing::trace;

use crate::{credits::check_status, error::Result};

/// One entry in the user's session list.
///
/// A session created by a turn may not have a title yet; the runtime fills
/// it in asynchronously after the first response completes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SessionList {
    sessions: Vec<SessionSummary>,
}

#[derive(Debug, Clone)]
pub struct SessionsClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SessionsClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch the user's sessions, newest first as the server returns them.
    pub async fn list(&self, user_id: &str) -> Result<Vec<SessionSummary>> {
        let url = format!("{}/api/sessions", self.base_url);

        trace!(%url, user_id, "Fetching session list.");
        let response = self
            .http_client
            .get(&url)
            .query(&[("user_id", user_id)])
            .send()
            .await?;
        let response = check_status(response).await?;

        Ok(response.json::<SessionList>().await?.sessions)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_list_sessions() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/sessions")
                    .query_param("user_id", "user-1");
                then.status(200).json_body(serde_json::json!({
                    "sessions": [
                        { "session_id": "s2", "title": "BTC outlook" },
                        { "session_id": "s1" },
                    ]
                }));
            })
            .await;

        let sessions = SessionsClient::new(server.base_url())
            .list("user-1")
            .await
            .expect("session list");

        assert_eq!(sessions, vec![
            SessionSummary {
                session_id: "s2".to_owned(),
                title: Some("BTC outlook".to_owned()),
            },
            SessionSummary {
                session_id: "s1".to_owned(),
                title: None,
            },
        ]);
    }
}
