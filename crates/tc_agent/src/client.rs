//! HTTP client for the agent runtime's streaming run endpoint.

use std::{io, pin::Pin};

use async_stream::stream;
use futures::{Stream, StreamExt as _, TryStreamExt as _};
use tokio_util::{
    bytes::Buf,
    codec::{FramedRead, LinesCodec, LinesCodecError},
    io::StreamReader,
    sync::CancellationToken,
};
use tracing::{debug, error, trace};

use crate::{
    error::{Error, Result},
    event::ServerEvent,
    sse::FrameParser,
};

/// A stream of typed events decoded from one agent run.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ServerEvent>> + Send>>;

/// The two agents a user can open a session with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentKind {
    #[default]
    Analyst,
    Trader,
}

impl AgentKind {
    /// The runtime identifier the agent is registered under.
    #[must_use]
    pub const fn agent_id(self) -> &'static str {
        match self {
            Self::Analyst => "crypto-analyst-agent",
            Self::Trader => "crypto-trader-agent",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyst => f.write_str("analyst"),
            Self::Trader => f.write_str("trader"),
        }
    }
}

/// One user-initiated run of an agent.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub agent: AgentKind,
    pub message: String,
    pub user_id: String,
    pub session_id: String,
}

#[derive(Debug, Clone)]
pub struct Client {
    http_client: reqwest::Client,
    base_url: String,
}

impl Client {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Start an agent run and return the stream of decoded events.
    ///
    /// The returned stream honors `cancel` cooperatively: it is observed at
    /// every read suspension, and once triggered the stream ends without
    /// yielding anything further. Tearing down the stream drops the
    /// underlying connection.
    pub async fn run(
        &self,
        request: &RunRequest,
        cancel: CancellationToken,
    ) -> Result<EventStream> {
        let url = format!("{}/agents/{}/runs", self.base_url, request.agent.agent_id());
        let form = [
            ("message", request.message.as_str()),
            ("stream", "True"),
            ("user_id", request.user_id.as_str()),
            ("session_id", request.session_id.as_str()),
        ];

        trace!(%url, agent = %request.agent, "Starting agent run.");
        let response = self.http_client.post(&url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_owned()
            } else {
                body
            };

            error!(code, message, "Agent run request rejected.");
            return Err(Error::Api { code, message });
        }

        let bytes = response.bytes_stream().map_err(io::Error::other);
        Ok(events(decode_lines(bytes), cancel))
    }
}

/// Decode a byte stream into newline-terminated lines.
///
/// Multi-byte UTF-8 sequences and partial lines spanning chunk boundaries
/// are buffered by the codec until the terminating newline arrives.
fn decode_lines<S, B>(bytes: S) -> impl Stream<Item = std::result::Result<String, LinesCodecError>>
where
    S: Stream<Item = io::Result<B>>,
    B: Buf,
{
    FramedRead::new(StreamReader::new(bytes), LinesCodec::new())
}

/// Turn a line stream into an [`EventStream`], parsing SSE frames as they
/// arrive and observing `cancel` at each suspension.
fn events<S>(lines: S, cancel: CancellationToken) -> EventStream
where
    S: Stream<Item = std::result::Result<String, LinesCodecError>> + Send + 'static,
{
    Box::pin(stream! {
        let mut parser = FrameParser::new();
        let mut lines = std::pin::pin!(lines);

        loop {
            let line = tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!("Agent run cancelled, closing event stream.");
                    break;
                }
                line = lines.next() => line,
            };

            let Some(line) = line else { break };

            match line {
                Ok(line) => {
                    if let Some(event) = parser.push_line(&line) {
                        yield Ok(event);
                    }
                }
                Err(error) => {
                    yield Err(Error::Stream(error.to_string()));
                    break;
                }
            }
        }
    })
}
