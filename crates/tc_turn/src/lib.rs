pub mod assembler;
pub mod controller;
pub mod detector;
pub mod error;
pub mod tracker;
pub mod turn;

pub use assembler::MessageAssembler;
pub use controller::{NullObserver, RefusedReason, Toast, TurnController, TurnObserver, TurnOutcome};
pub use detector::detect_coins;
pub use error::Error;
pub use tracker::{ToolCall, ToolState, ToolTracker};
pub use turn::{Exchange, TurnStatus};
