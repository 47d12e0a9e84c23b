// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// A minimal file looks like:
///
/// ```toml
/// [server]
/// root = "_build/html"
///
/// [rule.docs]
/// watch = ["src/**/*.rst"]
/// cmd = "make html"
/// ```
///
/// All sections except `[rule.<name>]` are optional and have reasonable
/// defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// HTTP server settings from `[server]`.
    #[serde(default)]
    pub server: ServerSection,

    /// Rebuild behaviour from `[build]`.
    #[serde(default)]
    pub build: BuildSection,

    /// Defaults applied to every rule, from `[default]`.
    #[serde(default)]
    pub default: DefaultSection,

    /// All watch rules from `[rule.<name>]`.
    ///
    /// Keys are the *rule names* (e.g. `"docs"`, `"assets"`).
    #[serde(default)]
    pub rule: BTreeMap<String, RuleConfig>,
}

/// `[server]` section.
///
/// Describes where the generated output lives and how to serve it.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Directory served over HTTP. Rebuild commands are expected to write
    /// their output here.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Bind host. Use `"0.0.0.0"` to expose the server on all interfaces.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Open the served URL in a browser once the server is listening.
    #[serde(default)]
    pub open: bool,
}

fn default_root() -> PathBuf {
    PathBuf::from("_build/html")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            host: default_host(),
            port: default_port(),
            open: false,
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Run every rule's command once at startup, before the server binds.
    #[serde(default = "default_initial")]
    pub initial: bool,

    /// Quiet interval in milliseconds. All change events for a rule arriving
    /// within this window collapse into a single command invocation.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_initial() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            initial: default_initial(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// `[default]` section.
///
/// Mirrors files like:
///
/// ```toml
/// [default]
/// exclude = ["**/.git/**", "**/*.swp"]
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    /// Default `exclude` patterns applied to rules that do not override them.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[rule.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    /// The rebuild command to execute through the shell.
    pub cmd: String,

    /// Glob patterns (relative to the config file's directory) that trigger
    /// this rule when a matching file changes.
    pub watch: Vec<String>,

    /// Optional rule-local exclude patterns.
    ///
    /// If `None`, the rule uses `default.exclude`.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    /// If true, `default.exclude` is appended to `rule.exclude`.
    ///
    /// Otherwise, `rule.exclude` replaces `default.exclude`.
    #[serde(default)]
    pub append_default_exclude: bool,
}
