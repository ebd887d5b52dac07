//! See [`TurnController`].

use std::time::Instant;

use futures::StreamExt as _;
use tc_agent::{AgentKind, RunRequest, ServerEvent};
use tc_api::{CreditsClient, SessionSummary, SessionsClient};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    assembler::MessageAssembler,
    detector::detect_coins,
    error::Result,
    tracker::ToolTracker,
    turn::{Exchange, TurnStatus},
};

/// Transient notifications surfaced to the user outside the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toast {
    /// The user must sign in before chatting.
    SignInRequired,

    /// The pre-flight gate refused the turn; carries the current balance.
    InsufficientCredits { credits: i64 },
}

/// Why a submission was refused without starting a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusedReason {
    /// The trimmed input was empty; nothing happened.
    EmptyInput,

    /// No signed-in user is configured.
    NotSignedIn,

    /// A turn is already in flight.
    TurnInFlight,
}

/// Terminal result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed {
        assistant_text: String,
        coins: Vec<&'static str>,
        total_tokens: u64,
    },
    Aborted {
        assistant_text: String,
    },
    Failed {
        message: String,
    },
    InsufficientCredits {
        credits: i64,
    },
    Refused(RefusedReason),
}

/// Receives view updates while a turn runs.
///
/// All methods default to no-ops so implementors only handle what they
/// render. Callbacks arrive on the same task as the stream reader, in
/// event order.
pub trait TurnObserver {
    fn on_status(&mut self, _status: TurnStatus) {}

    /// The assembled assistant message changed; `assembled` is the full
    /// current snapshot, not a delta.
    fn on_content(&mut self, _assembled: &str) {}

    fn on_thinking(&mut self, _thinking: bool) {}

    /// A tool call started; `started_at` is the tracked start time the
    /// view layer should run live timers from.
    fn on_tool_started(&mut self, _name: &str, _started_at: Instant) {}

    fn on_tool_completed(&mut self, _name: &str, _duration_seconds: f64) {}

    fn on_toast(&mut self, _toast: &Toast) {}

    /// Detected-coin chips for the finished turn.
    fn on_coins(&mut self, _coins: &[&'static str]) {}

    /// The displayed credit balance changed.
    fn on_credits(&mut self, _credits: i64) {}
}

/// A no-op observer, for callers that only want the outcome.
#[derive(Debug, Default)]
pub struct NullObserver;

impl TurnObserver for NullObserver {}

/// In-flight state of the active turn.
struct ActiveTurn {
    assembler: MessageAssembler,
    tracker: ToolTracker,
    total_tokens: Option<u64>,
}

impl ActiveTurn {
    fn new() -> Self {
        Self {
            assembler: MessageAssembler::new(),
            tracker: ToolTracker::new(),
            total_tokens: None,
        }
    }
}

/// Drives turns against the agent runtime and its collaborators.
///
/// The controller owns the conversation history, the session identity and
/// the displayed credit balance. One turn runs at a time; `send` holds
/// `&mut self` for its whole duration, and the state gate additionally
/// refuses re-entry should a stale status ever linger.
pub struct TurnController {
    agent: tc_agent::Client,
    credits: CreditsClient,
    sessions: SessionsClient,

    agent_kind: AgentKind,
    user_id: Option<String>,
    session_id: String,

    status: TurnStatus,
    history: Vec<Exchange>,
    session_list: Vec<SessionSummary>,
    credit_balance: Option<i64>,
}

impl TurnController {
    #[must_use]
    pub fn new(
        agent: tc_agent::Client,
        credits: CreditsClient,
        sessions: SessionsClient,
        agent_kind: AgentKind,
        user_id: Option<String>,
    ) -> Self {
        Self {
            agent,
            credits,
            sessions,
            agent_kind,
            user_id,
            session_id: new_session_id(),
            status: TurnStatus::Idle,
            history: Vec::new(),
            session_list: Vec::new(),
            credit_balance: None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> TurnStatus {
        self.status
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub const fn agent_kind(&self) -> AgentKind {
        self.agent_kind
    }

    #[must_use]
    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    #[must_use]
    pub fn session_list(&self) -> &[SessionSummary] {
        &self.session_list
    }

    #[must_use]
    pub const fn credit_balance(&self) -> Option<i64> {
        self.credit_balance
    }

    /// Switch to an existing session. The conversation history of this
    /// process belongs to the previous session and is discarded.
    pub fn set_session(&mut self, session_id: impl Into<String>) {
        self.session_id = session_id.into();
        self.history.clear();
        self.status = TurnStatus::Idle;
    }

    /// Start a fresh session with a new identifier.
    pub fn new_session(&mut self) {
        self.set_session(new_session_id());
    }

    /// Submit one user prompt and drive the turn to a terminal state.
    ///
    /// `cancel` is the turn's abort handle: triggering it (the stop
    /// button) tears the transport down at the next suspension and ends
    /// the turn as `Aborted` with the partial transcript kept.
    pub async fn send(
        &mut self,
        text: &str,
        cancel: CancellationToken,
        observer: &mut impl TurnObserver,
    ) -> Result<TurnOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(TurnOutcome::Refused(RefusedReason::EmptyInput));
        }

        let Some(user_id) = self.user_id.clone() else {
            observer.on_toast(&Toast::SignInRequired);
            return Ok(TurnOutcome::Refused(RefusedReason::NotSignedIn));
        };

        if self.status.is_busy() {
            debug!(status = %self.status, "Refusing submit while a turn is in flight.");
            return Ok(TurnOutcome::Refused(RefusedReason::TurnInFlight));
        }

        self.set_status(TurnStatus::Submitting, observer);

        // Pre-flight gate. This is the only collaborator call allowed to
        // block submission; its failure aborts the turn before anything
        // is recorded.
        let gate = match self.credits.can_chat(&user_id).await {
            Ok(gate) => gate,
            Err(error) => {
                self.set_status(TurnStatus::Idle, observer);
                return Err(crate::Error::Credits(error));
            }
        };

        self.credit_balance = Some(gate.credits);
        if !gate.can_chat {
            info!(credits = gate.credits, "Chat gate refused the turn.");
            observer.on_toast(&Toast::InsufficientCredits {
                credits: gate.credits,
            });
            self.set_status(TurnStatus::Idle, observer);
            return Ok(TurnOutcome::InsufficientCredits {
                credits: gate.credits,
            });
        }
        observer.on_credits(gate.credits);

        // Optimistic view update: the user bubble and an empty assistant
        // placeholder appear before the transport connects.
        let mut turn = ActiveTurn::new();
        observer.on_content(turn.assembler.assembled());
        observer.on_thinking(true);

        let request = RunRequest {
            agent: self.agent_kind,
            message: text.to_owned(),
            user_id: user_id.clone(),
            session_id: self.session_id.clone(),
        };

        let mut stream = match self.agent.run(&request, cancel.clone()).await {
            Ok(stream) => stream,
            Err(error) => {
                return Ok(self.fail_turn(text, turn, &error_message(&error), observer));
            }
        };

        self.set_status(TurnStatus::Streaming, observer);

        let mut failure = None;
        while let Some(event) = stream.next().await {
            match event {
                Ok(event) => route_event(&mut turn, event, observer),
                Err(error) => {
                    failure = Some(error_message(&error));
                    break;
                }
            }
        }
        drop(stream);

        if let Some(message) = failure {
            return Ok(self.fail_turn(text, turn, &message, observer));
        }

        if cancel.is_cancelled() {
            return Ok(self.abort_turn(text, turn, observer));
        }

        Ok(self.finalize_turn(text, &user_id, turn, observer).await)
    }

    /// Stream closed normally: run the post-turn side effects.
    ///
    /// Each effect is independent and best-effort; a failure is logged and
    /// swallowed without touching the transcript.
    async fn finalize_turn(
        &mut self,
        user_text: &str,
        user_id: &str,
        mut turn: ActiveTurn,
        observer: &mut impl TurnObserver,
    ) -> TurnOutcome {
        self.set_status(TurnStatus::Finalizing, observer);

        match self.sessions.list(user_id).await {
            Ok(sessions) => self.session_list = sessions,
            Err(error) => warn!(%error, "Failed to refresh session list."),
        }

        let total_tokens = turn.total_tokens.unwrap_or_default();
        if total_tokens > 0 {
            match self
                .credits
                .deduct_tokens(user_id, total_tokens, &self.session_id)
                .await
            {
                Ok(deduction) => {
                    self.credit_balance = Some(deduction.current_credits);
                    observer.on_credits(deduction.current_credits);
                }
                Err(error) => warn!(%error, "Failed to deduct credits."),
            }
        }

        let assistant_text = turn.assembler.into_assembled();
        let coins = detect_coins(&assistant_text);
        observer.on_coins(&coins);

        turn.tracker.clear_start_times();

        self.history.push(Exchange {
            user_text: user_text.to_owned(),
            assistant_text: assistant_text.clone(),
            coins: coins.clone(),
        });
        self.set_status(TurnStatus::Done, observer);

        TurnOutcome::Completed {
            assistant_text,
            coins,
            total_tokens,
        }
    }

    /// The user stopped the turn: keep the partial transcript, skip all
    /// post effects.
    fn abort_turn(
        &mut self,
        user_text: &str,
        mut turn: ActiveTurn,
        observer: &mut impl TurnObserver,
    ) -> TurnOutcome {
        info!("Turn aborted by user.");
        turn.tracker.clear_start_times();

        let assistant_text = turn.assembler.into_assembled();
        self.history.push(Exchange {
            user_text: user_text.to_owned(),
            assistant_text: assistant_text.clone(),
            coins: Vec::new(),
        });
        self.set_status(TurnStatus::Aborted, observer);

        TurnOutcome::Aborted { assistant_text }
    }

    /// Transport failure: make it visible in the transcript.
    fn fail_turn(
        &mut self,
        user_text: &str,
        mut turn: ActiveTurn,
        message: &str,
        observer: &mut impl TurnObserver,
    ) -> TurnOutcome {
        warn!(message, "Turn failed.");
        turn.assembler.push_error(message);
        observer.on_content(turn.assembler.assembled());
        turn.tracker.clear_start_times();

        self.history.push(Exchange {
            user_text: user_text.to_owned(),
            assistant_text: turn.assembler.into_assembled(),
            coins: Vec::new(),
        });
        self.set_status(TurnStatus::Failed, observer);

        TurnOutcome::Failed {
            message: message.to_owned(),
        }
    }

    fn set_status(&mut self, status: TurnStatus, observer: &mut impl TurnObserver) {
        self.status = status;
        observer.on_status(status);
    }
}

/// Apply one decoded event to the active turn.
///
/// Stray completions (unknown call id) and duplicate starts are dropped
/// here before they can touch the assembler.
fn route_event(turn: &mut ActiveTurn, event: ServerEvent, observer: &mut impl TurnObserver) {
    let thinking_before = turn.assembler.is_thinking();

    match event {
        ServerEvent::Content { text } => {
            if turn.assembler.push_content(&text) {
                observer.on_content(turn.assembler.assembled());
            }
        }
        ServerEvent::ToolCallStarted {
            tool_name,
            tool_call_id,
        } => {
            if turn.tracker.start(&tool_call_id, &tool_name) {
                let started_at = turn.tracker.start_times()[tool_name.as_str()];
                turn.assembler.push_tool_started(&tool_name);
                observer.on_tool_started(&tool_name, started_at);
                observer.on_content(turn.assembler.assembled());
            }
        }
        ServerEvent::ToolCallCompleted {
            tool_name,
            tool_call_id,
            duration_seconds,
        } => {
            if turn.tracker.complete(&tool_call_id, duration_seconds).is_some() {
                if turn.assembler.complete_tool(&tool_name, duration_seconds) {
                    observer.on_content(turn.assembler.assembled());
                }
                observer.on_tool_completed(&tool_name, duration_seconds);
            } else {
                debug!(tool_call_id, "Dropping completion for unknown call id.");
            }
        }
        ServerEvent::RunCompleted { metrics } => {
            if let Some(metrics) = metrics
                && metrics.total_tokens > 0
                && turn.total_tokens.is_none()
            {
                turn.total_tokens = Some(metrics.total_tokens);
            }
            turn.assembler.run_completed();
        }
        ServerEvent::Unknown => {}
    }

    if turn.assembler.is_thinking() != thinking_before {
        observer.on_thinking(turn.assembler.is_thinking());
    }
}

/// The visible message for a transport error. API rejections surface the
/// server's own words; everything else uses the error's display form.
fn error_message(error: &tc_agent::Error) -> String {
    match error {
        tc_agent::Error::Api { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

/// Generate a fresh opaque session identifier.
fn new_session_id() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    format!("tc-{nanos:x}-{:x}", std::process::id())
}
