use futures::StreamExt as _;
use httpmock::prelude::*;
use serde_json::json;
use tc_agent::{AgentKind, Client, Error, RunRequest, ServerEvent};
use tc_test::sse;
use tokio_util::sync::CancellationToken;

fn request(agent: AgentKind) -> RunRequest {
    RunRequest {
        agent,
        message: "How is BTC looking?".to_owned(),
        user_id: "user-1".to_owned(),
        session_id: "session-1".to_owned(),
    }
}

#[test_log::test(tokio::test)]
async fn test_run_stream() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/agents/crypto-analyst-agent/runs")
                .body_contains("stream=True")
                .body_contains("user_id=user-1")
                .body_contains("session_id=session-1");
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(sse::body(&[
                    sse::tool_started("get_btc_dominance", "a1"),
                    sse::tool_completed("get_btc_dominance", "a1", 1.2345),
                    sse::content("BTC dominance is 54%."),
                    sse::run_completed(Some(42)),
                ]));
        })
        .await;

    let events = Client::new(server.base_url())
        .run(&request(AgentKind::Analyst), CancellationToken::new())
        .await
        .expect("connected")
        .map(|event| event.expect("valid event"))
        .collect::<Vec<_>>()
        .await;

    mock.assert_async().await;

    assert_eq!(events.len(), 4);
    assert!(matches!(
        &events[0],
        ServerEvent::ToolCallStarted { tool_name, tool_call_id }
            if tool_name == "get_btc_dominance" && tool_call_id == "a1"
    ));
    assert!(matches!(
        &events[2],
        ServerEvent::Content { text } if text == "BTC dominance is 54%."
    ));
    assert!(matches!(
        &events[3],
        ServerEvent::RunCompleted { metrics: Some(metrics) } if metrics.total_tokens == 42
    ));
}

#[test_log::test(tokio::test)]
async fn test_run_rejected_maps_status_line() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/agents/crypto-trader-agent/runs");
            then.status(503);
        })
        .await;

    let error = Client::new(server.base_url())
        .run(&request(AgentKind::Trader), CancellationToken::new())
        .await
        .map(|_| ())
        .expect_err("must be rejected");

    match error {
        Error::Api { code, message } => {
            assert_eq!(code, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_run_rejected_keeps_body_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/agents/crypto-analyst-agent/runs");
            then.status(422).body("unknown session");
        })
        .await;

    let error = Client::new(server.base_url())
        .run(&request(AgentKind::Analyst), CancellationToken::new())
        .await
        .map(|_| ())
        .expect_err("must be rejected");

    match error {
        Error::Api { code, message } => {
            assert_eq!(code, 422);
            assert_eq!(message, "unknown session");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_malformed_frames_are_skipped() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/agents/crypto-analyst-agent/runs");
            then.status(200).body(format!(
                "event: ToolCallStarted\ndata: {{not json\n\n{}",
                sse::frame("RunContent", &json!({ "content": "still here" })),
            ));
        })
        .await;

    let events = Client::new(server.base_url())
        .run(&request(AgentKind::Analyst), CancellationToken::new())
        .await
        .expect("connected")
        .map(|event| event.expect("valid event"))
        .collect::<Vec<_>>()
        .await;

    assert_eq!(events, vec![ServerEvent::Content {
        text: "still here".to_owned()
    }]);
}
