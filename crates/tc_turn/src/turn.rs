//! See [`TurnStatus`] and [`Exchange`].

/// The state machine of a single turn.
///
/// Transitions only move forward. `Done`, `Aborted` and `Failed` are the
/// terminal states; `Aborted` is reached through the user's stop action,
/// `Failed` through a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnStatus {
    #[default]
    Idle,
    Submitting,
    Streaming,
    Finalizing,
    Done,
    Aborted,
    Failed,
}

impl TurnStatus {
    /// Returns `true` once the turn reached one of its terminal states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted | Self::Failed)
    }

    /// Returns `true` while a turn is in flight. A second submission must
    /// be refused while this holds.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Submitting | Self::Streaming | Self::Finalizing)
    }
}

impl std::fmt::Display for TurnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Streaming => "streaming",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        };

        f.write_str(name)
    }
}

/// A finished turn, kept in the conversation history.
///
/// Once a turn reaches a terminal state its transcript is immutable; an
/// aborted turn keeps whatever prose had arrived, a failed turn keeps the
/// appended error line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// The verbatim user prompt.
    pub user_text: String,

    /// The final assembled assistant message.
    pub assistant_text: String,

    /// Canonical symbols of the coins detected in the final message.
    /// Empty for aborted and failed turns, which skip detection.
    pub coins: Vec<&'static str>,
}
