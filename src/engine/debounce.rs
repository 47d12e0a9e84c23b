// src/engine/debounce.rs

use std::collections::HashMap;

use tracing::debug;

use super::runtime::RuleName;

/// Per-rule trigger phase.
///
/// - `Idle`: nothing pending, nothing running.
/// - `Waiting`: a change was seen; a quiet-interval timer is running.
/// - `Running`: the rule's command is executing.
/// - `RunningDirty`: the command is executing *and* another change arrived
///   meanwhile. Exactly one follow-up run will happen afterwards, no matter
///   how many changes piled up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Waiting,
    Running,
    RunningDirty,
}

/// What the runtime should do in response to a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    /// First change for this rule since it went quiet; start the quiet-interval
    /// timer.
    StartTimer,
    /// A timer or a follow-up run already covers this change; nothing to do.
    Coalesced,
}

/// Coalesces filesystem triggers into a minimal number of command runs.
///
/// Semantics:
/// - All triggers for a rule within the quiet interval collapse into one run.
/// - Triggers arriving while the rule's command is running collapse into
///   exactly one follow-up run, started (after a fresh quiet interval) once
///   the command returns. A change during a build is never lost and never
///   fans out into multiple runs.
///
/// This struct is a pure state machine; the runtime owns the actual timers
/// and command dispatch.
#[derive(Debug)]
pub struct Debouncer {
    phases: HashMap<RuleName, Phase>,
}

impl Debouncer {
    /// Create a debouncer tracking the given rule names.
    pub fn new<I, N>(rules: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<RuleName>,
    {
        let phases = rules
            .into_iter()
            .map(|name| (name.into(), Phase::Idle))
            .collect();
        Self { phases }
    }

    /// A filesystem change matched this rule.
    pub fn on_trigger(&mut self, rule: &str) -> TriggerDecision {
        match self.phase(rule) {
            Phase::Idle => {
                self.set_phase(rule, Phase::Waiting);
                debug!(rule = %rule, "first trigger, starting quiet interval");
                TriggerDecision::StartTimer
            }
            Phase::Waiting => {
                debug!(rule = %rule, "trigger coalesced into running quiet interval");
                TriggerDecision::Coalesced
            }
            Phase::Running => {
                self.set_phase(rule, Phase::RunningDirty);
                debug!(rule = %rule, "trigger during build, follow-up run recorded");
                TriggerDecision::Coalesced
            }
            Phase::RunningDirty => {
                debug!(rule = %rule, "trigger coalesced into pending follow-up run");
                TriggerDecision::Coalesced
            }
        }
    }

    /// The quiet interval for this rule elapsed.
    ///
    /// Returns true if the rule's command should be dispatched now.
    pub fn on_quiet_elapsed(&mut self, rule: &str) -> bool {
        match self.phase(rule) {
            Phase::Waiting => {
                self.set_phase(rule, Phase::Running);
                true
            }
            // A stale timer (e.g. the rule was already dispatched) must not
            // cause a second run.
            phase => {
                debug!(rule = %rule, ?phase, "ignoring stale quiet-interval expiry");
                false
            }
        }
    }

    /// The rule's command returned (success or failure).
    ///
    /// Returns true if a change arrived during the run, in which case the
    /// runtime should start a fresh quiet-interval timer.
    pub fn on_build_finished(&mut self, rule: &str) -> bool {
        match self.phase(rule) {
            Phase::RunningDirty => {
                self.set_phase(rule, Phase::Waiting);
                debug!(rule = %rule, "build finished with pending changes, re-arming");
                true
            }
            _ => {
                self.set_phase(rule, Phase::Idle);
                false
            }
        }
    }

    fn phase(&self, rule: &str) -> Phase {
        self.phases.get(rule).copied().unwrap_or(Phase::Idle)
    }

    fn set_phase(&mut self, rule: &str, phase: Phase) {
        self.phases.insert(rule.to_string(), phase);
    }
}
