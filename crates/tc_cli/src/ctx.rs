//! See [`Ctx`].

use tc_api::{CreditsClient, SessionsClient};
use tc_turn::TurnController;

use crate::config::Config;

/// Shared state for command execution.
pub(crate) struct Ctx {
    pub(crate) config: Config,
    pub(crate) controller: TurnController,
    pub(crate) credits: CreditsClient,
    pub(crate) sessions: SessionsClient,
}

impl Ctx {
    pub(crate) fn new(config: Config) -> Self {
        let credits = CreditsClient::new(config.api_url().to_owned());
        let sessions = SessionsClient::new(config.api_url().to_owned());
        let controller = TurnController::new(
            tc_agent::Client::new(config.runtime_url.clone()),
            credits.clone(),
            sessions.clone(),
            config.agent.into(),
            config.user_id.clone(),
        );

        Self {
            config,
            controller,
            credits,
            sessions,
        }
    }

    /// The signed-in user, or a configuration error telling them how to
    /// sign in.
    pub(crate) fn user_id(&self) -> crate::error::Result<&str> {
        self.config.user_id.as_deref().ok_or_else(|| {
            crate::error::Error::Config(
                "no user_id configured; set `user_id` in tickerchat.toml or export TC_USER_ID"
                    .to_owned(),
            )
        })
    }
}
