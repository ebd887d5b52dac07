//! See [`FrameParser`].

use serde_json::Value;
use tracing::debug;

use crate::event::ServerEvent;

/// Incremental parser for the runtime's SSE frame grammar.
///
/// Frames are line-oriented pairs:
///
/// ```text
/// event: <EventName>
/// data: <JSON object>
/// ```
///
/// The parser is fed one line at a time and emits at most one
/// [`ServerEvent`] per `data:` line. The `event:` name is latched in a
/// single slot and consumed by the next `data:` line, whether or not its
/// payload parses. Blank lines and unrecognized line kinds are ignored.
#[derive(Debug, Default)]
pub struct FrameParser {
    current_event: Option<String>,
}

impl FrameParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its trailing newline) into the parser.
    pub fn push_line(&mut self, line: &str) -> Option<ServerEvent> {
        // CRLF streams may leave a trailing carriage return behind.
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.trim().is_empty() {
            return None;
        }

        if let Some(name) = line.strip_prefix("event:") {
            self.current_event = Some(name.trim().to_owned());
            return None;
        }

        let data = line.strip_prefix("data:")?;

        // The latched event name is consumed even when the payload turns
        // out to be malformed.
        let header = self.current_event.take();

        let payload: Value = match serde_json::from_str(data.trim()) {
            Ok(payload) => payload,
            Err(error) => {
                debug!(%error, "Dropping SSE frame with malformed JSON payload.");
                return None;
            }
        };

        Some(resolve(header.as_deref(), &payload))
    }
}

/// Resolve an event from its (optional) header name and payload.
///
/// The header wins when it names a known kind. Otherwise the payload's own
/// `event` field is consulted, and as a last resort a payload carrying a
/// `content` string is treated as assistant prose.
fn resolve(header: Option<&str>, payload: &Value) -> ServerEvent {
    if let Some(event) = header.and_then(|kind| ServerEvent::from_payload(kind, payload)) {
        return event;
    }

    if let Some(event) = payload
        .get("event")
        .and_then(Value::as_str)
        .and_then(|kind| ServerEvent::from_payload(kind, payload))
    {
        return event;
    }

    if let Some(text) = payload.get("content").and_then(Value::as_str) {
        return ServerEvent::Content {
            text: text.to_owned(),
        };
    }

    ServerEvent::Unknown
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::event::RunMetrics;

    fn collect(lines: &[&str]) -> Vec<ServerEvent> {
        let mut parser = FrameParser::new();
        lines
            .iter()
            .filter_map(|line| parser.push_line(line))
            .collect()
    }

    #[test]
    fn test_content_frames() {
        let events = collect(&[
            "event: RunContent",
            r#"data: {"content":"Hello "}"#,
            "",
            "event: RunContent",
            r#"data: {"content":"world."}"#,
            "",
        ]);

        assert_eq!(events, vec![
            ServerEvent::Content {
                text: "Hello ".to_owned()
            },
            ServerEvent::Content {
                text: "world.".to_owned()
            },
        ]);
    }

    #[test]
    fn test_tool_round_trip() {
        let events = collect(&[
            "event: ToolCallStarted",
            r#"data: {"tool":{"tool_name":"get_btc_dominance","tool_call_id":"a1"}}"#,
            "",
            "event: ToolCallCompleted",
            r#"data: {"tool":{"tool_name":"get_btc_dominance","tool_call_id":"a1","metrics":{"duration":1.2345}}}"#,
            "",
            "event: RunCompleted",
            r#"data: {"metrics":{"total_tokens":42}}"#,
        ]);

        assert_eq!(events, vec![
            ServerEvent::ToolCallStarted {
                tool_name: "get_btc_dominance".to_owned(),
                tool_call_id: "a1".to_owned(),
            },
            ServerEvent::ToolCallCompleted {
                tool_name: "get_btc_dominance".to_owned(),
                tool_call_id: "a1".to_owned(),
                duration_seconds: 1.2345,
            },
            ServerEvent::RunCompleted {
                metrics: Some(RunMetrics { total_tokens: 42 })
            },
        ]);
    }

    #[test]
    fn test_malformed_payload_consumes_header() {
        let mut parser = FrameParser::new();

        assert_eq!(parser.push_line("event: ToolCallStarted"), None);
        assert_eq!(parser.push_line("data: {not json"), None);

        // The header was consumed by the malformed frame, so a bare content
        // payload resolves as prose, not as a tool event.
        assert_eq!(
            parser.push_line(r#"data: {"content":"hi"}"#),
            Some(ServerEvent::Content {
                text: "hi".to_owned()
            })
        );
    }

    #[test]
    fn test_payload_event_field_resolution() {
        // No `event:` header, the payload names its own kind.
        let events = collect(&[r#"data: {"event":"RunCompleted","metrics":{"total_tokens":7}}"#]);

        assert_eq!(events, vec![ServerEvent::RunCompleted {
            metrics: Some(RunMetrics { total_tokens: 7 })
        }]);
    }

    #[test]
    fn test_header_wins_over_payload_event_field() {
        let events = collect(&[
            "event: ToolCallStarted",
            r#"data: {"event":"RunCompleted","tool":{"tool_name":"x"}}"#,
        ]);

        assert_eq!(events, vec![ServerEvent::ToolCallStarted {
            tool_name: "x".to_owned(),
            tool_call_id: "x".to_owned(),
        }]);
    }

    #[test]
    fn test_unknown_event() {
        let events = collect(&[
            "event: SomethingNew",
            r#"data: {"detail":"irrelevant"}"#,
        ]);

        assert_eq!(events, vec![ServerEvent::Unknown]);
    }

    #[test]
    fn test_blank_and_stray_lines_ignored() {
        let events = collect(&["", "   ", ": comment", "id: 3", r#"data: {"content":"x"}"#]);

        assert_eq!(events, vec![ServerEvent::Content {
            text: "x".to_owned()
        }]);
    }

    #[test]
    fn test_crlf_tolerated() {
        let events = collect(&["event: RunContent\r", "data: {\"content\":\"ok\"}\r"]);

        assert_eq!(events, vec![ServerEvent::Content {
            text: "ok".to_owned()
        }]);
    }
}
