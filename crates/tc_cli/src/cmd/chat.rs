use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::exit,
};

use crossterm::style::Stylize as _;
use tc_turn::TurnOutcome;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::{
    cmd::Success,
    ctx::Ctx,
    error::{Error, Result},
    render::Renderer,
};

#[derive(Debug, clap::Args)]
pub(crate) struct Chat {
    /// The message to send. Omit to start an interactive session.
    message: Option<String>,

    /// Write the final result of a completed turn to this file.
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,
}

impl Chat {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Result<Success> {
        if let Some(message) = self.message.clone() {
            let outcome = send_with_stop(ctx, &message).await?;
            self.handle_outcome(&outcome).await?;
            return Ok(Success::Ok);
        }

        self.interactive(ctx).await
    }

    async fn interactive(&self, ctx: &mut Ctx) -> Result<Success> {
        println!(
            "{}",
            format!(
                "session {} with the {} agent. Empty line or /quit exits, /new starts over.",
                ctx.controller.session_id(),
                ctx.config.agent
            )
            .dim()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let exchanges = ctx.controller.history().len();
            if exchanges > 0 {
                println!("{}", format!("({exchanges} exchanges this session)").dim());
            }

            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match line.trim() {
                "" | "/quit" | "/exit" => break,
                "/new" => {
                    ctx.controller.new_session();
                    println!("{}", format!("session {}", ctx.controller.session_id()).dim());
                }
                text => {
                    let outcome = send_with_stop(ctx, text).await?;
                    self.handle_outcome(&outcome).await?;
                }
            }
        }

        Ok(Success::Ok)
    }

    async fn handle_outcome(&self, outcome: &TurnOutcome) -> Result<()> {
        match outcome {
            TurnOutcome::Completed { assistant_text, .. } => {
                if let Some(path) = &self.save {
                    save_final_result(path, assistant_text).await?;
                }
            }
            TurnOutcome::Aborted { .. } => println!("{}", "(stopped)".dim()),
            // Failures and refusals were already rendered.
            _ => {}
        }

        Ok(())
    }
}

/// Run one turn, turning Ctrl-C into a stop request. A second Ctrl-C
/// exits the process.
async fn send_with_stop(ctx: &mut Ctx, text: &str) -> Result<TurnOutcome> {
    let cancel = CancellationToken::new();
    let mut renderer = Renderer::new();

    // Scoped so the turn future releases its borrow of the renderer
    // before we finish it up.
    let outcome = {
        let send = ctx.controller.send(text, cancel.clone(), &mut renderer);
        tokio::pin!(send);

        loop {
            tokio::select! {
                outcome = &mut send => break outcome?,
                result = tokio::signal::ctrl_c() => {
                    result?;

                    if cancel.is_cancelled() {
                        exit(130);
                    }

                    trace!("Stop requested; cancelling the turn.");
                    cancel.cancel();
                }
            }
        }
    };

    renderer.finish();
    Ok(outcome)
}

/// Write the final-result block of a completed turn to `path`.
async fn save_final_result(path: &Path, assistant_text: &str) -> Result<()> {
    let blocks = tc_view::tokenize(assistant_text);

    let Some(block) = blocks.iter().find(|block| block.final_result) else {
        println!("{}", "No final result block to save.".yellow());
        return Ok(());
    };

    tokio::fs::write(path, block.joined_text())
        .await
        .map_err(Error::Io)?;

    println!("{}", format!("Saved final result to {}.", path.display()).dim());
    Ok(())
}
