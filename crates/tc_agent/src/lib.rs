pub mod client;
pub mod error;
pub mod event;
pub mod sse;

pub use client::{AgentKind, Client, EventStream, RunRequest};
pub use error::Error;
pub use event::{RunMetrics, ServerEvent};
pub use sse::FrameParser;
