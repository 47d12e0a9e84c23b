// src/engine/mod.rs

//! Orchestration engine for liveserve.
//!
//! This module ties together:
//! - the per-rule debouncer (coalescing bursts of change events)
//! - the main runtime event loop that reacts to:
//!   - file-watch triggers
//!   - quiet-interval expiries
//!   - rebuild completion events
//!   - shutdown signals

pub mod debounce;
pub mod runtime;

pub use debounce::{Debouncer, TriggerDecision};
pub use runtime::{BuildOutcome, RuleName, Runtime, RuntimeEvent, RuntimeOptions};
