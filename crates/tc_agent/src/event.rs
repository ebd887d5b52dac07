//! See [`ServerEvent`].

use serde_json::Value;

/// A single typed event decoded from the agent runtime's SSE stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// The assistant started executing a tool.
    ToolCallStarted {
        /// Name of the tool being executed.
        tool_name: String,

        /// Opaque identifier for this specific call. Falls back to the tool
        /// name when the runtime omits it.
        tool_call_id: String,
    },

    /// A previously started tool call finished.
    ToolCallCompleted {
        /// Name of the tool that finished.
        tool_name: String,

        /// Identifier matching the corresponding `ToolCallStarted`.
        tool_call_id: String,

        /// Server-reported execution time, in seconds. Authoritative over
        /// any client-measured elapsed time.
        duration_seconds: f64,
    },

    /// The run finished. Carries usage metrics when the runtime reports
    /// them.
    RunCompleted { metrics: Option<RunMetrics> },

    /// A chunk of assistant prose.
    Content { text: String },

    /// An event kind this client does not recognize. Ignored by callers.
    Unknown,
}

/// Usage metrics attached to a [`ServerEvent::RunCompleted`] event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunMetrics {
    pub total_tokens: u64,
}

impl ServerEvent {
    /// Build a [`ServerEvent`] of the named kind from its JSON payload.
    ///
    /// Returns `None` when `kind` is not one of the recognized event names.
    pub(crate) fn from_payload(kind: &str, payload: &Value) -> Option<Self> {
        match kind {
            "ToolCallStarted" => {
                let (tool_name, tool_call_id) = tool_identity(payload);
                Some(Self::ToolCallStarted {
                    tool_name,
                    tool_call_id,
                })
            }
            "ToolCallCompleted" => {
                let (tool_name, tool_call_id) = tool_identity(payload);
                let duration_seconds = payload
                    .pointer("/tool/metrics/duration")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0);

                Some(Self::ToolCallCompleted {
                    tool_name,
                    tool_call_id,
                    duration_seconds,
                })
            }
            "RunCompleted" => Some(Self::RunCompleted {
                metrics: payload
                    .pointer("/metrics/total_tokens")
                    .and_then(Value::as_u64)
                    .map(|total_tokens| RunMetrics { total_tokens }),
            }),
            _ => None,
        }
    }
}

/// Extract the tool name and call id from a tool event payload.
///
/// The runtime does not always send a call id, in which case the tool name
/// doubles as the id. A missing name falls back to the literal `tool`.
fn tool_identity(payload: &Value) -> (String, String) {
    let tool_name = payload
        .pointer("/tool/tool_name")
        .and_then(Value::as_str)
        .unwrap_or("tool")
        .to_owned();

    let tool_call_id = payload
        .pointer("/tool/tool_call_id")
        .and_then(Value::as_str)
        .map_or_else(|| tool_name.clone(), str::to_owned);

    (tool_name, tool_call_id)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_tool_identity_fallbacks() {
        let payload = json!({ "tool": { "tool_name": "get_btc_dominance" } });
        assert_eq!(
            tool_identity(&payload),
            ("get_btc_dominance".to_owned(), "get_btc_dominance".to_owned())
        );

        let payload = json!({});
        assert_eq!(tool_identity(&payload), ("tool".to_owned(), "tool".to_owned()));

        let payload = json!({ "tool": { "tool_name": "x", "tool_call_id": "a1" } });
        assert_eq!(tool_identity(&payload), ("x".to_owned(), "a1".to_owned()));
    }

    #[test]
    fn test_completed_duration_fallback() {
        let payload = json!({ "tool": { "tool_name": "x" } });
        assert_eq!(
            ServerEvent::from_payload("ToolCallCompleted", &payload),
            Some(ServerEvent::ToolCallCompleted {
                tool_name: "x".to_owned(),
                tool_call_id: "x".to_owned(),
                duration_seconds: 0.0,
            })
        );
    }

    #[test]
    fn test_run_completed_metrics() {
        let payload = json!({ "metrics": { "total_tokens": 42 } });
        assert_eq!(
            ServerEvent::from_payload("RunCompleted", &payload),
            Some(ServerEvent::RunCompleted {
                metrics: Some(RunMetrics { total_tokens: 42 })
            })
        );

        assert_eq!(
            ServerEvent::from_payload("RunCompleted", &json!({})),
            Some(ServerEvent::RunCompleted { metrics: None })
        );
    }

    #[test]
    fn test_unrecognized_kind() {
        assert_eq!(ServerEvent::from_payload("RunContent", &json!({})), None);
    }
}
