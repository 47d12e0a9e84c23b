// src/engine/runtime.rs

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::debounce::{Debouncer, TriggerDecision};
use crate::exec::BuildJob;

/// Public type alias for rule names throughout the engine.
pub type RuleName = String;

/// Result of a rebuild command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    Failed(i32), // exit code
}

/// Events sent into the runtime from the watcher, executor, timers, or
/// external signals.
///
/// The idea is that:
/// - the watcher sends `RuleTriggered`
/// - quiet-interval timers send `QuietElapsed`
/// - the executor sends `BuildCompleted`
/// - Ctrl-C handling sends `ShutdownRequested`
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    RuleTriggered { rule: RuleName },
    QuietElapsed { rule: RuleName },
    BuildCompleted { rule: RuleName, outcome: BuildOutcome },
    ShutdownRequested,
}

/// Options that influence how the runtime behaves.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Quiet interval over which change events for a rule are coalesced.
    pub debounce: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
        }
    }
}

/// The main orchestration runtime.
///
/// Responsibilities:
/// - Consume `RuntimeEvent`s from the watcher/executor/ctrl-c.
/// - Apply debounce semantics per rule.
/// - Send `BuildJob`s to the executor when a rule's quiet interval elapses.
///
/// A failed build is logged and otherwise ignored; the server keeps serving
/// whatever output the last successful build produced.
pub struct Runtime {
    /// Rule name -> rebuild command.
    commands: HashMap<RuleName, String>,
    debouncer: Debouncer,
    options: RuntimeOptions,

    /// Unified event stream from all producers (watcher, executor, timers,
    /// signal handler).
    events_rx: mpsc::Receiver<RuntimeEvent>,

    /// Loopback sender used to schedule `QuietElapsed` timer events.
    events_tx: mpsc::Sender<RuntimeEvent>,

    /// Channel to executor: whenever a rule is due, we send its job here.
    exec_tx: mpsc::Sender<BuildJob>,
}

impl Runtime {
    pub fn new(
        commands: HashMap<RuleName, String>,
        options: RuntimeOptions,
        events_rx: mpsc::Receiver<RuntimeEvent>,
        events_tx: mpsc::Sender<RuntimeEvent>,
        exec_tx: mpsc::Sender<BuildJob>,
    ) -> Self {
        let debouncer = Debouncer::new(commands.keys().cloned());
        Self {
            commands,
            debouncer,
            options,
            events_rx,
            events_tx,
            exec_tx,
        }
    }

    /// Main event loop.
    ///
    /// This should be called from `lib.rs` after:
    /// - config is loaded & validated
    /// - the initial build (if any) has returned
    /// - watcher, executor and the HTTP server have been spawned and given a
    ///   clone of the `mpsc::Sender<RuntimeEvent>` where relevant
    ///
    /// It blocks until `ShutdownRequested` arrives.
    pub async fn run(mut self) -> Result<()> {
        info!("liveserve runtime started");

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "runtime received event");

            let keep_running = match event {
                RuntimeEvent::RuleTriggered { rule } => self.handle_rule_trigger(rule),
                RuntimeEvent::QuietElapsed { rule } => self.handle_quiet_elapsed(rule).await?,
                RuntimeEvent::BuildCompleted { rule, outcome } => {
                    self.handle_build_completion(rule, outcome)
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping runtime");
                    false
                }
            };

            if !keep_running {
                break;
            }
        }

        info!("liveserve runtime exiting");
        Ok(())
    }

    /// Handle a trigger from the file watcher.
    fn handle_rule_trigger(&mut self, rule: RuleName) -> bool {
        match self.debouncer.on_trigger(&rule) {
            TriggerDecision::StartTimer => self.start_quiet_timer(rule),
            TriggerDecision::Coalesced => {
                debug!(rule = %rule, "trigger coalesced");
            }
        }
        true
    }

    /// A rule's quiet interval elapsed; dispatch its command if still due.
    async fn handle_quiet_elapsed(&mut self, rule: RuleName) -> Result<bool> {
        if !self.debouncer.on_quiet_elapsed(&rule) {
            return Ok(true);
        }

        let Some(cmd) = self.commands.get(&rule) else {
            warn!(rule = %rule, "quiet interval elapsed for unknown rule");
            return Ok(true);
        };

        info!(rule = %rule, cmd = %cmd, "changes settled, dispatching rebuild");

        let job = BuildJob {
            rule: rule.clone(),
            cmd: cmd.clone(),
        };
        if let Err(err) = self.exec_tx.send(job).await {
            error!(error = %err, "failed to send build job to executor");
            // If the executor channel is closed, there's not much we can do.
            // Bubble up the error so higher layers can decide what to do.
            return Err(err.into());
        }

        Ok(true)
    }

    /// Handle completion of a rebuild command.
    ///
    /// Failures are non-fatal: the previously built output keeps being served
    /// until the next successful rebuild.
    fn handle_build_completion(&mut self, rule: RuleName, outcome: BuildOutcome) -> bool {
        match outcome {
            BuildOutcome::Success => info!(rule = %rule, "rebuild completed successfully"),
            BuildOutcome::Failed(code) => {
                warn!(rule = %rule, exit_code = code, "rebuild failed, serving stale output");
            }
        }

        if self.debouncer.on_build_finished(&rule) {
            // Changes arrived mid-build; give them a fresh quiet interval.
            self.start_quiet_timer(rule);
        }

        true
    }

    /// Spawn a timer that re-enters the event loop once the quiet interval for
    /// `rule` has elapsed.
    fn start_quiet_timer(&self, rule: RuleName) {
        let tx = self.events_tx.clone();
        let quiet = self.options.debounce;
        tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let _ = tx.send(RuntimeEvent::QuietElapsed { rule }).await;
        });
    }
}
