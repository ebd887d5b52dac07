mod cmd;
mod config;
mod ctx;
pub mod error;
mod render;

use std::{fmt, process::ExitCode};

use clap::{ArgAction, Parser};
use cmd::{Commands, Success};
use crossterm::style::Stylize as _;
use ctx::Ctx;
use error::Result;
use tracing::trace;

// Tickerchat, a terminal client for a crypto-analysis agent runtime.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten, next_help_heading = "Global Options")]
    globals: Globals,

    #[command(subcommand, next_help_heading = "Options")]
    command: Commands,
}

#[derive(Debug, clap::Args)]
pub struct Globals {
    /// Increase verbosity of logging.
    ///
    /// Can be specified multiple times to increase verbosity.
    ///
    /// Defaults to printing "error" messages. For each increase in verbosity,
    /// the log level is set to "warn", "info", "debug", and "trace"
    /// respectively.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all output, including errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// The agent to talk to, overriding the configured default.
    #[arg(long, global = true, value_enum)]
    agent: Option<config::Agent>,

    /// Resume an existing session instead of starting a new one.
    #[arg(long, global = true, value_name = "ID")]
    session: Option<String>,

    /// Base URL of the agent runtime.
    #[arg(long, global = true, value_name = "URL")]
    runtime_url: Option<String>,
}

impl fmt::Display for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entry(&"verbose", &self.globals.verbose)
            .entry(&"quiet", &self.globals.quiet)
            .entry(&"agent", &self.globals.agent)
            .entry(&"session", &self.globals.session)
            .finish()
    }
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    configure_logging(cli.globals.verbose, cli.globals.quiet);
    trace!(command = cli.command.name(), arguments = %cli, "Starting CLI run.");

    match run_inner(cli).await {
        Ok(success) => {
            let output = output_to_string(success);
            if !output.is_empty() {
                println!("{output}");
            }

            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", format!("error: {error}").red());
            ExitCode::FAILURE
        }
    }
}

async fn run_inner(cli: Cli) -> Result<Success> {
    let mut config = config::Config::load()?;
    if let Some(agent) = cli.globals.agent {
        config.agent = agent;
    }
    if let Some(runtime_url) = cli.globals.runtime_url {
        config.runtime_url = runtime_url;
    }

    let mut ctx = Ctx::new(config);
    if let Some(session) = cli.globals.session {
        ctx.controller.set_session(session);
    }

    cli.command.run(&mut ctx).await
}

fn output_to_string(success: Success) -> String {
    match success {
        Success::Ok => String::new(),
        Success::Message(message) => message,
        Success::Table { header, rows } => {
            let mut table = comfy_table::Table::new();
            table.load_preset(comfy_table::presets::NOTHING);
            table.set_header(header);
            for row in rows {
                table.add_row(row);
            }

            table.to_string()
        }
    }
}

fn configure_logging(verbose: u8, quiet: bool) {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::fmt;

    let mut level = match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    if quiet {
        level = LevelFilter::OFF;
    }

    let mut filter = vec!["off".to_owned()];
    for krate in ["agent", "api", "cli", "turn", "view"] {
        filter.push(format!("tc_{krate}={level}"));
    }

    let format = fmt::format().with_target(false).compact();

    if level < LevelFilter::DEBUG {
        tracing_subscriber::fmt()
            .event_format(format)
            .without_time()
            .with_ansi(true)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    } else {
        tracing_subscriber::fmt()
            .event_format(format)
            .with_ansi(true)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }
}
