// src/exec/command.rs

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::{BuildOutcome, RuleName, RuntimeEvent};

/// A rebuild command scheduled for execution.
#[derive(Debug, Clone)]
pub struct BuildJob {
    pub rule: RuleName,
    pub cmd: String,
}

/// Spawn the background executor loop.
///
/// The returned `mpsc::Sender<BuildJob>` is what the runtime uses as
/// `exec_tx`. Each job is executed in its own Tokio task, so rules can rebuild
/// in parallel (the runtime's debouncer guarantees at most one run per rule at
/// a time).
pub fn spawn_executor(runtime_tx: mpsc::Sender<RuntimeEvent>) -> mpsc::Sender<BuildJob> {
    let (tx, mut rx) = mpsc::channel::<BuildJob>(32);

    tokio::spawn(async move {
        info!("executor loop started");
        while let Some(job) = rx.recv().await {
            let runtime_tx = runtime_tx.clone();
            tokio::spawn(async move {
                run_build(job, runtime_tx).await;
            });
        }
        info!("executor loop finished (channel closed)");
    });

    tx
}

/// Run a single rebuild process, handling stdout/stderr and emitting
/// `BuildCompleted` events on success/failure.
///
/// All errors are converted into a failed completion event with exit code -1;
/// they are also logged via `tracing::error!`.
async fn run_build(job: BuildJob, runtime_tx: mpsc::Sender<RuntimeEvent>) {
    let rule = job.rule.clone();
    if let Err(err) = run_build_inner(job, &runtime_tx).await {
        error!(rule = %rule, error = %err, "rebuild execution error");
        let _ = runtime_tx
            .send(RuntimeEvent::BuildCompleted {
                rule,
                outcome: BuildOutcome::Failed(-1),
            })
            .await;
    }
}

async fn run_build_inner(job: BuildJob, runtime_tx: &mpsc::Sender<RuntimeEvent>) -> Result<()> {
    info!(rule = %job.rule, cmd = %job.cmd, "starting rebuild process");

    let mut cmd = shell_command(&job.cmd);
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for rule '{}'", job.rule))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Consume both streams so buffers don't fill; log at debug.
    if let Some(stdout) = stdout {
        let rule = job.rule.clone();
        tokio::spawn(async move {
            let reader = BufReader::new(stdout);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(rule = %rule, "stdout: {}", line);
            }
        });
    }
    if let Some(stderr) = stderr {
        let rule = job.rule.clone();
        tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(rule = %rule, "stderr: {}", line);
            }
        });
    }

    // Wait for the child to exit.
    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of rule '{}'", job.rule))?;

    let code = status.code().unwrap_or(-1);
    let outcome = if status.success() {
        BuildOutcome::Success
    } else {
        BuildOutcome::Failed(code)
    };

    info!(
        rule = %job.rule,
        exit_code = code,
        success = status.success(),
        "rebuild process exited"
    );

    runtime_tx
        .send(RuntimeEvent::BuildCompleted {
            rule: job.rule.clone(),
            outcome,
        })
        .await
        .with_context(|| {
            format!(
                "sending BuildCompleted event for rule '{}' to runtime",
                job.rule
            )
        })?;

    Ok(())
}

/// Run a rebuild command to completion, ignoring its exit status.
///
/// Used for the initial build at startup: the command's output streams are
/// inherited so build diagnostics land on the terminal, the call returns once
/// the process does, and a nonzero exit is logged but intentionally ignored —
/// startup proceeds and whatever output already exists keeps being served.
///
/// No timeout is applied; a hanging build blocks startup for as long as it
/// runs.
pub async fn run_ignoring_status(rule: &str, cmd_str: &str) {
    info!(rule = %rule, cmd = %cmd_str, "running initial build");

    let mut cmd = shell_command(cmd_str);
    match cmd.status().await {
        Ok(status) if status.success() => {
            info!(rule = %rule, "initial build succeeded");
        }
        Ok(status) => {
            warn!(
                rule = %rule,
                exit_code = status.code().unwrap_or(-1),
                "initial build failed, continuing with existing output"
            );
        }
        Err(err) => {
            warn!(rule = %rule, error = %err, "initial build could not be spawned, continuing");
        }
    }
}

/// Open `url` in the platform's default browser, fire-and-forget.
pub fn open_browser(url: &str) {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg("start").arg("").arg(url);
        c
    } else if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(url);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };

    cmd.stdout(Stdio::null()).stderr(Stdio::null());

    match cmd.spawn() {
        Ok(_) => debug!(url = %url, "opening browser"),
        Err(err) => warn!(url = %url, error = %err, "failed to open browser"),
    }
}

/// Build a shell command appropriate for the platform.
fn shell_command(cmd_str: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_str);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_str);
        c
    }
}
