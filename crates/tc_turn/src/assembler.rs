//! See [`MessageAssembler`].

use tracing::debug;

/// Owns the growing assistant-message string of one turn.
///
/// The string only ever changes through two operations: appending (prose,
/// tool sentinels, the final error line) and in-place substitution of a
/// pending tool sentinel with its completed form. Everything already in the
/// buffer outside the substituted sentinel stays byte-identical, so the
/// view layer can treat successive snapshots as monotonic.
#[derive(Debug)]
pub struct MessageAssembler {
    assembled: String,
    thinking: bool,
}

impl Default for MessageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            assembled: String::new(),
            thinking: true,
        }
    }

    #[must_use]
    pub fn assembled(&self) -> &str {
        &self.assembled
    }

    /// The "thinking" indicator: true between a tool completion and the
    /// next content, tool start or run completion.
    #[must_use]
    pub const fn is_thinking(&self) -> bool {
        self.thinking
    }

    #[must_use]
    pub fn into_assembled(self) -> String {
        self.assembled
    }

    /// Append a chunk of prose. An empty chunk is a no-op and does not
    /// touch the thinking indicator.
    pub fn push_content(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        self.assembled.push_str(text);
        self.thinking = false;
        true
    }

    /// Append the pending sentinel for a started tool.
    pub fn push_tool_started(&mut self, name: &str) {
        self.assembled.push('\n');
        self.assembled.push_str(name);
        self.assembled.push_str("(...)");
        self.thinking = false;
    }

    /// Substitute the most recent pending sentinel of `name` with its
    /// completed form, carrying the server-reported duration.
    ///
    /// The scan runs backwards over literal sentinel occurrences and skips
    /// any whose continuation already reads ` completed`. When no pending
    /// sentinel exists (the start event was missed), the completion is
    /// dropped without mutating anything.
    pub fn complete_tool(&mut self, name: &str, duration_seconds: f64) -> bool {
        let sentinel = format!("\n{name}(...)");

        let target = self
            .assembled
            .rmatch_indices(&sentinel)
            .map(|(index, _)| index)
            .find(|index| {
                !self.assembled[index + sentinel.len()..].starts_with(" completed")
            });

        let Some(index) = target else {
            debug!(name, "No pending sentinel for tool completion, dropping.");
            return false;
        };

        self.assembled.replace_range(
            index..index + sentinel.len(),
            &format!("\n{name}(...) completed in {duration_seconds:.4}s."),
        );
        self.thinking = true;
        true
    }

    /// Mark the end of the run.
    pub fn run_completed(&mut self) {
        self.thinking = false;
    }

    /// Append the visible error line for a transport failure.
    pub fn push_error(&mut self, message: &str) {
        self.assembled.push_str("\n\n\u{274c} Error: ");
        self.assembled.push_str(message);
        self.thinking = false;
    }
}
