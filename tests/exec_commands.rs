#![cfg(unix)]

use std::error::Error;
use std::fs;
use std::time::Duration;

use liveserve::engine::{BuildOutcome, RuntimeEvent};
use liveserve::exec::{run_ignoring_status, spawn_executor, BuildJob};
use tokio::sync::mpsc;
use tokio::time::timeout;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn failing_initial_build_does_not_propagate() -> TestResult {
    // Returns normally; the nonzero exit is logged and dropped.
    run_ignoring_status("docs", "exit 1").await;
    run_ignoring_status("docs", "/no/such/binary-xyz").await;
    Ok(())
}

#[tokio::test]
async fn executor_runs_command_and_reports_success() -> TestResult {
    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("built.txt");

    let (rt_tx, mut rt_rx) = mpsc::channel::<RuntimeEvent>(8);
    let exec_tx = spawn_executor(rt_tx);

    exec_tx
        .send(BuildJob {
            rule: "docs".to_string(),
            cmd: format!("echo done > {}", marker.display()),
        })
        .await?;

    let event = timeout(Duration::from_secs(5), rt_rx.recv())
        .await?
        .expect("executor should report completion");

    match event {
        RuntimeEvent::BuildCompleted { rule, outcome } => {
            assert_eq!(rule, "docs");
            assert_eq!(outcome, BuildOutcome::Success);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let contents = fs::read_to_string(&marker)?;
    assert_eq!(contents.trim(), "done");

    Ok(())
}

#[tokio::test]
async fn executor_reports_failure_with_exit_code() -> TestResult {
    let (rt_tx, mut rt_rx) = mpsc::channel::<RuntimeEvent>(8);
    let exec_tx = spawn_executor(rt_tx);

    exec_tx
        .send(BuildJob {
            rule: "docs".to_string(),
            cmd: "exit 3".to_string(),
        })
        .await?;

    let event = timeout(Duration::from_secs(5), rt_rx.recv())
        .await?
        .expect("executor should report completion");

    match event {
        RuntimeEvent::BuildCompleted { rule, outcome } => {
            assert_eq!(rule, "docs");
            assert_eq!(outcome, BuildOutcome::Failed(3));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    Ok(())
}
