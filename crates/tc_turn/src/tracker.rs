//! See [`ToolTracker`].

use std::time::Instant;

use indexmap::IndexMap;
use tracing::debug;

/// Execution state of one tracked tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolState {
    Running,
    Completed,
}

/// One tool call observed on the stream.
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Tool identifier, e.g. `get_token_analysis`.
    pub name: String,

    /// Monotonic timestamp captured when the start event was seen.
    pub started_at: Instant,

    /// Set when the completion event arrives.
    pub completed_at: Option<Instant>,

    /// Server-reported duration in seconds. Authoritative over the
    /// client-measured `completed_at - started_at`.
    pub duration_seconds: Option<f64>,

    pub state: ToolState,
}

/// Tracks the tool calls of one turn, keyed by call id.
///
/// Start times are mirrored into a separate map keyed by tool *name*, which
/// the view layer reads to drive live elapsed timers without touching the
/// rest of the turn state. That map survives individual completions and is
/// only cleared when the turn reaches a terminal state, so a re-render
/// mid-finalization still resolves.
#[derive(Debug, Default)]
pub struct ToolTracker {
    tools: IndexMap<String, ToolCall>,
    start_times: IndexMap<String, Instant>,
}

impl ToolTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a started tool call. Idempotent per call id: a second start
    /// with the same id is ignored and returns `false`.
    pub fn start(&mut self, tool_call_id: &str, name: &str) -> bool {
        if self.tools.contains_key(tool_call_id) {
            debug!(tool_call_id, "Ignoring duplicate tool call start.");
            return false;
        }

        let started_at = Instant::now();
        self.tools.insert(tool_call_id.to_owned(), ToolCall {
            name: name.to_owned(),
            started_at,
            completed_at: None,
            duration_seconds: None,
            state: ToolState::Running,
        });
        // A new call of a tool that already ran restarts its timer.
        self.start_times.insert(name.to_owned(), started_at);

        true
    }

    /// Record a completed tool call, removing it from the running set.
    ///
    /// Returns `None` for an unknown or already-completed id: such a stray
    /// completion must not mutate any state.
    pub fn complete(&mut self, tool_call_id: &str, duration_seconds: f64) -> Option<&ToolCall> {
        let call = self.tools.get_mut(tool_call_id)?;
        if call.state == ToolState::Completed {
            debug!(tool_call_id, "Ignoring completion of already-completed call.");
            return None;
        }

        call.state = ToolState::Completed;
        call.completed_at = Some(Instant::now());
        call.duration_seconds = Some(duration_seconds);

        Some(call)
    }

    /// All calls still in the running state, in start order.
    pub fn running(&self) -> impl Iterator<Item = (&str, &ToolCall)> {
        self.tools
            .iter()
            .filter(|(_, call)| call.state == ToolState::Running)
            .map(|(id, call)| (id.as_str(), call))
    }

    #[must_use]
    pub fn has_running(&self) -> bool {
        self.running().next().is_some()
    }

    /// The per-tool-name start times exported to the view layer.
    #[must_use]
    pub const fn start_times(&self) -> &IndexMap<String, Instant> {
        &self.start_times
    }

    /// Drop the exported start times. Called once, at turn terminal.
    pub fn clear_start_times(&mut self) {
        self.start_times.clear();
    }
}
