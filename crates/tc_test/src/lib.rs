//! Shared helpers for the Tickerchat test suites.

pub mod sse;
