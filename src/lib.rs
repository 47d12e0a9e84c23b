// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod serve;
pub mod watch;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{RuleName, Runtime, RuntimeEvent, RuntimeOptions};
use crate::errors::Result;
use crate::watch::{build_rule_profiles, RawRulePatternSpec, WatchDefaults};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (with CLI overrides)
/// - the initial build
/// - the file watcher
/// - the executor
/// - the static HTTP server
/// - Ctrl-C handling
///
/// Startup ordering matters: the initial build returns before any watch rule
/// is registered, and the server socket binds before the runtime loop starts
/// blocking.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let mut cfg = load_and_validate(&config_path)?;
    apply_cli_overrides(&mut cfg, &args);

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    // Initial build: run each rule's command once, in order, before anything
    // watches or serves. Exit statuses are ignored on purpose; a broken build
    // at startup just means stale (or missing) output until the next rebuild.
    if cfg.build.initial && !args.no_build {
        for (name, rule) in cfg.rule.iter() {
            exec::run_ignoring_status(name, &rule.cmd).await;
        }
    }

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Process executor.
    let exec_tx = exec::spawn_executor(rt_tx.clone());

    // File watcher over the config file's directory.
    let defaults = WatchDefaults {
        exclude: cfg.default.exclude.clone(),
    };

    let specs: Vec<RawRulePatternSpec> = cfg
        .rule
        .iter()
        .map(|(name, rule)| RawRulePatternSpec {
            name: name.clone(),
            watch: rule.watch.clone(),
            exclude: rule.exclude.clone(),
            append_default_exclude: rule.append_default_exclude,
        })
        .collect();

    let profiles = build_rule_profiles(&defaults, &specs)?;

    let root_dir = config_root_dir(&config_path);
    let _watcher_handle = watch::spawn_watcher(root_dir, profiles, rt_tx.clone())?;

    // HTTP server. Binding fails fast (e.g. port already in use) before the
    // runtime loop starts.
    let listener = serve::bind(&cfg.server.host, cfg.server.port).await?;
    let serve_root = resolve_serve_root(&config_path, &cfg.server.root);

    if cfg.server.open {
        exec::open_browser(&browse_url(&cfg));
    }

    tokio::spawn(async move {
        if let Err(err) = serve::serve(listener, serve_root).await {
            eprintln!("liveserve server error: {err:?}");
            std::process::exit(1);
        }
    });

    // Ctrl-C -> graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let commands: HashMap<RuleName, String> = cfg
        .rule
        .iter()
        .map(|(name, rule)| (name.clone(), rule.cmd.clone()))
        .collect();

    let options = RuntimeOptions {
        debounce: Duration::from_millis(cfg.build.debounce_ms),
    };

    let runtime = Runtime::new(commands, options, rt_rx, rt_tx, exec_tx);
    runtime.run().await
}

/// CLI flags override the corresponding `[server]` / `[build]` settings.
fn apply_cli_overrides(cfg: &mut ConfigFile, args: &CliArgs) {
    if let Some(ref host) = args.host {
        cfg.server.host = host.clone();
    }
    if let Some(port) = args.port {
        cfg.server.port = port;
    }
    if let Some(ref root) = args.root {
        cfg.server.root = root.clone();
    }
    if args.open {
        cfg.server.open = true;
    }
}

/// Figure out a sensible project root for watching.
/// Currently: directory containing the config file, or `.`.
fn config_root_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Resolve the served root relative to the config file's directory.
fn resolve_serve_root(config_path: &Path, root: &Path) -> PathBuf {
    if root.is_absolute() {
        root.to_path_buf()
    } else {
        config_root_dir(config_path).join(root)
    }
}

/// URL handed to the browser. A wildcard bind is reachable via loopback.
fn browse_url(cfg: &ConfigFile) -> String {
    let host = if cfg.server.host == "0.0.0.0" {
        "127.0.0.1"
    } else {
        cfg.server.host.as_str()
    };
    format!("http://{}:{}/", host, cfg.server.port)
}

/// Simple dry-run output: print server settings and rules.
fn print_dry_run(cfg: &ConfigFile) {
    println!("liveserve dry-run");
    println!("  server.host = {}", cfg.server.host);
    println!("  server.port = {}", cfg.server.port);
    println!("  server.root = {}", cfg.server.root.display());
    println!("  server.open = {}", cfg.server.open);
    println!("  build.initial = {}", cfg.build.initial);
    println!("  build.debounce_ms = {}", cfg.build.debounce_ms);
    println!();

    println!("rules ({}):", cfg.rule.len());
    for (name, rule) in cfg.rule.iter() {
        println!("  - {name}");
        println!("      cmd: {}", rule.cmd);
        println!("      watch: {:?}", rule.watch);
        if let Some(ref exclude) = rule.exclude {
            if !exclude.is_empty() {
                println!("      exclude: {:?}", exclude);
            }
        }
        if rule.append_default_exclude {
            println!("      append_default_exclude: true");
        }
    }

    info!("dry-run complete (no execution)");
}
