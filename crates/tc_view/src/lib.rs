//! Derived view model for the assembled assistant message.
//!
//! Everything in this crate is a pure projection: the assembled string and
//! the tool start times are owned elsewhere, and re-tokenizing the same
//! input always yields the same blocks.

pub mod block;
pub mod timer;
pub mod tokenizer;

pub use block::{GroupBlock, ToolLine};
pub use timer::LiveTimer;
pub use tokenizer::tokenize;
