// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `liveserve`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "liveserve",
    version,
    about = "Watch a documentation tree, rebuild on change, serve the output over HTTP.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Liveserve.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Liveserve.toml")]
    pub config: String,

    /// Bind host (overrides `[server].host`).
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Bind port (overrides `[server].port`).
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Directory to serve (overrides `[server].root`).
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Open the served URL in a browser once listening.
    #[arg(long)]
    pub open: bool,

    /// Skip the initial build at startup.
    #[arg(long)]
    pub no_build: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LIVESERVE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the resolved rules and server config, but
    /// don't watch, build or serve anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
