mod chat;
mod credits;
mod sessions;

use crate::{ctx::Ctx, error::Result};

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Commands {
    /// Talk to the agent, one-shot or interactively.
    #[command(visible_alias = "c")]
    Chat(chat::Chat),

    /// List the stored sessions of the signed-in user.
    #[command(visible_alias = "s", alias = "session")]
    Sessions(sessions::Sessions),

    /// Show the remaining credit balance.
    Credits(credits::Credits),
}

impl Commands {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Result<Success> {
        match self {
            Commands::Chat(args) => args.run(ctx).await,
            Commands::Sessions(args) => args.run(ctx).await,
            Commands::Credits(args) => args.run(ctx).await,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Commands::Chat(_) => "chat",
            Commands::Sessions(_) => "sessions",
            Commands::Credits(_) => "credits",
        }
    }
}

/// The type of output that should be printed to the screen.
#[derive(Debug)]
pub(crate) enum Success {
    /// The command was successful.
    Ok,

    /// Single message to be printed to the screen.
    Message(String),

    /// List of rows to be printed in a table.
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl From<()> for Success {
    fn from((): ()) -> Self {
        Self::Ok
    }
}

impl From<String> for Success {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for Success {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}
