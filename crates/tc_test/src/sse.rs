//! Builders for agent-runtime SSE bodies used in tests.

use serde_json::Value;

/// Build one SSE frame: an `event:` line, a `data:` line, and the blank
/// separator line.
#[must_use]
pub fn frame(event: &str, data: &Value) -> String {
    format!("event: {event}\ndata: {data}\n\n")
}

/// Build a full SSE body out of `(event name, payload)` pairs.
#[must_use]
pub fn body(frames: &[(&str, Value)]) -> String {
    frames
        .iter()
        .map(|(event, data)| frame(event, data))
        .collect()
}

/// A prose chunk frame, as the runtime emits it.
#[must_use]
pub fn content(text: &str) -> (&'static str, Value) {
    ("RunContent", serde_json::json!({ "content": text }))
}

/// A `ToolCallStarted` frame for the given tool name and call id.
#[must_use]
pub fn tool_started(name: &str, id: &str) -> (&'static str, Value) {
    (
        "ToolCallStarted",
        serde_json::json!({ "tool": { "tool_name": name, "tool_call_id": id } }),
    )
}

/// A `ToolCallCompleted` frame with a server-reported duration.
#[must_use]
pub fn tool_completed(name: &str, id: &str, duration: f64) -> (&'static str, Value) {
    (
        "ToolCallCompleted",
        serde_json::json!({
            "tool": { "tool_name": name, "tool_call_id": id, "metrics": { "duration": duration } }
        }),
    )
}

/// A terminal `RunCompleted` frame, optionally carrying a token count.
#[must_use]
pub fn run_completed(total_tokens: Option<u64>) -> (&'static str, Value) {
    let data = match total_tokens {
        Some(total_tokens) => serde_json::json!({ "metrics": { "total_tokens": total_tokens } }),
        None => serde_json::json!({}),
    };

    ("RunCompleted", data)
}
