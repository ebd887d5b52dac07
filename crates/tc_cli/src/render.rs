//! Terminal renderer for a streaming turn.

use std::{
    io::{IsTerminal as _, Write as _, stdout},
    time::Instant,
};

use crossterm::{
    cursor::MoveToColumn,
    execute,
    style::Stylize as _,
    terminal::{Clear, ClearType},
};
use tc_turn::{Toast, TurnObserver, TurnStatus};
use tc_view::LiveTimer;
use tokio_util::sync::CancellationToken;

/// Streams the assembled message to stdout as it grows.
///
/// Prose is printed incrementally from the snapshot diff. Tool sentinels
/// arrive through the same snapshots; while one is pending on a TTY, a
/// background ticker rewrites its line with a live elapsed label until the
/// completion substitutes the server duration.
pub(crate) struct Renderer {
    is_tty: bool,
    printed: String,
    pending_tool: Option<(String, Instant)>,
    ticker: Option<CancellationToken>,
    balance: Option<i64>,
}

impl Renderer {
    pub(crate) fn new() -> Self {
        Self {
            is_tty: stdout().is_terminal(),
            printed: String::new(),
            pending_tool: None,
            ticker: None,
            balance: None,
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    fn start_ticker(&mut self, name: &str, started_at: Instant) {
        if !self.is_tty {
            return;
        }

        let cancel = CancellationToken::new();
        let line = format!("{name}(...)");
        let timer = LiveTimer::new(started_at);
        let token = cancel.clone();

        tokio::spawn(async move {
            let mut interval = tc_view::timer::tick_interval();

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = interval.tick() => {
                        let mut out = stdout();
                        execute!(out, MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
                        write!(out, "{} {}", line.as_str().dim(), timer.live_label().dim()).ok();
                        out.flush().ok();
                    }
                }
            }
        });

        self.ticker = Some(cancel);
    }

    fn print_update(&mut self, assembled: &str) {
        let mut out = stdout();

        if let Some(suffix) = assembled.strip_prefix(self.printed.as_str()) {
            if self.pending_tool.is_some() {
                write!(out, "{}", suffix.dim()).ok();
            } else {
                write!(out, "{suffix}").ok();
            }
        } else {
            // A sentinel was substituted in place; rewrite its line.
            let line = assembled.rsplit('\n').next().unwrap_or(assembled);
            execute!(out, MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
            write!(out, "{}", line.dim()).ok();
        }

        out.flush().ok();
        self.printed = assembled.to_owned();
    }

    /// Print the post-turn summary line, if there is anything to say.
    pub(crate) fn finish(&mut self) {
        self.stop_ticker();
        println!();

        if let Some(balance) = self.balance.take() {
            println!("{}", format!("credits remaining: {balance}").dim());
        }
    }
}

impl TurnObserver for Renderer {
    fn on_status(&mut self, status: TurnStatus) {
        if status.is_terminal() {
            self.stop_ticker();
        }
    }

    fn on_content(&mut self, assembled: &str) {
        self.stop_ticker();
        self.print_update(assembled);

        if let Some((name, started_at)) = self.pending_tool.take() {
            self.start_ticker(&name, started_at);
        }
    }

    fn on_tool_started(&mut self, name: &str, started_at: Instant) {
        self.pending_tool = Some((name.to_owned(), started_at));
    }

    fn on_tool_completed(&mut self, _name: &str, _duration_seconds: f64) {
        self.pending_tool = None;
        self.stop_ticker();
    }

    fn on_toast(&mut self, toast: &Toast) {
        let message = match toast {
            Toast::SignInRequired => "Sign in to chat: configure user_id first.".to_owned(),
            Toast::InsufficientCredits { credits } => {
                format!("Not enough credits to chat (balance: {credits}).")
            }
        };

        println!("{}", message.yellow());
    }

    fn on_coins(&mut self, coins: &[&'static str]) {
        if coins.is_empty() {
            return;
        }

        let chips = coins
            .iter()
            .map(|coin| format!("[{coin}]"))
            .collect::<Vec<_>>()
            .join(" ");

        println!("\n{}", chips.cyan());
    }

    fn on_credits(&mut self, credits: i64) {
        self.balance = Some(credits);
    }
}
