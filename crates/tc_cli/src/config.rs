//! CLI configuration, from `tickerchat.toml` and `TC_` variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tc_agent::AgentKind;
use tracing::{trace, warn};

use crate::error::Result;

const FILE_NAME: &str = "tickerchat.toml";
const ENV_PREFIX: &str = "TC_";

/// The agent persona to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Agent {
    #[default]
    Analyst,
    Trader,
}

impl std::fmt::Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Analyst => "analyst",
            Self::Trader => "trader",
        })
    }
}

impl From<Agent> for AgentKind {
    fn from(agent: Agent) -> Self {
        match agent {
            Agent::Analyst => Self::Analyst,
            Agent::Trader => Self::Trader,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the agent runtime.
    pub runtime_url: String,

    /// Base URL of the credits and sessions API. Defaults to the runtime
    /// URL when unset.
    pub api_url: Option<String>,

    /// The signed-in user. Commands that need an account refuse to run
    /// while this is unset.
    pub user_id: Option<String>,

    /// Default agent for `tc chat`.
    pub agent: Agent,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtime_url: "http://localhost:8000".to_owned(),
            api_url: None,
            user_id: None,
            agent: Agent::default(),
        }
    }
}

impl Config {
    /// Load the configuration file and apply `TC_` variable overrides.
    ///
    /// A `tickerchat.toml` in the current directory wins over the one in
    /// the user's config directory; a missing file means defaults.
    pub(crate) fn load() -> Result<Self> {
        let mut config = match find_file() {
            Some(path) => {
                trace!(path = %path.display(), "Loading configuration file.");
                toml::from_str(&std::fs::read_to_string(&path)?)?
            }
            None => Self::default(),
        };

        config.apply_envs(std::env::vars());
        Ok(config)
    }

    #[must_use]
    pub(crate) fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(&self.runtime_url)
    }

    fn apply_envs(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            let Some(key) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            match key {
                "RUNTIME_URL" => self.runtime_url = value,
                "API_URL" => self.api_url = Some(value),
                "USER_ID" => self.user_id = Some(value),
                "AGENT" => match value.to_ascii_lowercase().as_str() {
                    "analyst" => self.agent = Agent::Analyst,
                    "trader" => self.agent = Agent::Trader,
                    other => warn!(agent = other, "Ignoring unknown TC_AGENT value."),
                },
                _ => {}
            }
        }
    }
}

fn find_file() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        let local = cwd.join(FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
    }

    directories::ProjectDirs::from("", "", "tickerchat")
        .map(|dirs| dirs.config_dir().join(FILE_NAME))
        .filter(|path| path.is_file())
}
