//! # airdrop-cli
//!
//! Command-line adapter for the claim pipeline. It stands in for an
//! event-triggered invocation transport:
//!
//! ```text
//! stdin (one JSON event per line) → ClaimSubmitter → stdout (one JSON outcome per line)
//! ```
//!
//! Outcomes are `{"ok": <receipt>}` or `{"error": "<message>"}`. Events are
//! handled one after another; a failed event never stops the stream.

pub mod runner;
pub mod telemetry;

pub use runner::{handle_line, run_lines};
pub use telemetry::init_tracing;
