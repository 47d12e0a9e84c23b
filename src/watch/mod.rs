// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling `watch` / `exclude` glob patterns per rule.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//!
//! It does **not** know about debouncing or command execution; it only turns
//! filesystem changes into rule-level triggers.

pub mod patterns;
pub mod watcher;

pub use patterns::{build_rule_profiles, RawRulePatternSpec, RuleWatchProfile, WatchDefaults};
pub use watcher::{spawn_watcher, WatcherHandle};
