// src/exec/mod.rs

//! External command execution.
//!
//! Rebuild commands are opaque shell invocations: their output is logged line
//! by line but never parsed, and a failing command never takes the process
//! down. The executor reports completion back to the runtime so the debouncer
//! knows when a rule is free to run again.

pub mod command;

pub use command::{open_browser, run_ignoring_status, spawn_executor, BuildJob};
