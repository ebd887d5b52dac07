//! See [`GroupBlock`] and [`ToolLine`].

/// One rendered tool step inside a [`GroupBlock`].
#[derive(Debug, Clone, PartialEq)]
pub struct ToolLine {
    /// The full matched token, as it should be displayed.
    pub label: String,

    /// The tool name, when the token carries one. Status lines such as
    /// `Searching …` have no name.
    pub name: Option<String>,

    /// Whether the token carries a completion clause.
    pub completed: bool,

    /// Server-reported duration parsed from the completion clause.
    pub duration_seconds: Option<f64>,
}

/// A homogeneous run of prose lines or tool lines.
///
/// Blocks alternate: a run of tool tokens closes the current prose block
/// and vice versa, so exactly one of the two lists is non-empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupBlock {
    pub text_parts: Vec<String>,
    pub tools: Vec<ToolLine>,

    /// Marks the last tool-free block whose joined prose exceeds 100
    /// characters. At most one block per message carries this flag.
    pub final_result: bool,
}

impl GroupBlock {
    /// The block's prose joined back into a single paragraph.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.text_parts.join("\n")
    }
}
