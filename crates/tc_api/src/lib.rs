pub mod credits;
pub mod error;
pub mod sessions;

pub use credits::{ChatGate, CreditsClient, Deduction};
pub use error::Error;
pub use sessions::{SessionSummary, SessionsClient};
