// src/config/validate.rs

use anyhow::{anyhow, Context, Result};
use globset::Glob;

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one rule
/// - every rule has at least one `watch` pattern
/// - all `watch` / `exclude` globs compile
/// - `build.debounce_ms >= 1`
/// - `server.host` is non-empty
///
/// It does **not** check that the served root directory exists: rebuild
/// commands commonly create it on the first run.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_rules(cfg)?;
    validate_server(cfg)?;
    validate_build(cfg)?;
    validate_patterns(cfg)?;
    Ok(())
}

fn ensure_has_rules(cfg: &ConfigFile) -> Result<()> {
    if cfg.rule.is_empty() {
        return Err(anyhow!(
            "config must contain at least one [rule.<name>] section"
        ));
    }
    Ok(())
}

fn validate_server(cfg: &ConfigFile) -> Result<()> {
    if cfg.server.host.trim().is_empty() {
        return Err(anyhow!("[server].host must not be empty"));
    }
    Ok(())
}

fn validate_build(cfg: &ConfigFile) -> Result<()> {
    if cfg.build.debounce_ms == 0 {
        return Err(anyhow!("[build].debounce_ms must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_patterns(cfg: &ConfigFile) -> Result<()> {
    for pat in cfg.default.exclude.iter() {
        check_glob(pat).context("invalid glob in [default].exclude")?;
    }

    for (name, rule) in cfg.rule.iter() {
        if rule.watch.is_empty() {
            return Err(anyhow!(
                "rule '{}' must have at least one `watch` pattern",
                name
            ));
        }
        if rule.cmd.trim().is_empty() {
            return Err(anyhow!("rule '{}' has an empty `cmd`", name));
        }

        for pat in rule.watch.iter() {
            check_glob(pat)
                .with_context(|| format!("invalid glob in rule '{}' `watch`", name))?;
        }
        if let Some(exclude) = &rule.exclude {
            for pat in exclude.iter() {
                check_glob(pat)
                    .with_context(|| format!("invalid glob in rule '{}' `exclude`", name))?;
            }
        }
    }

    Ok(())
}

fn check_glob(pattern: &str) -> Result<()> {
    Glob::new(pattern)
        .map(|_| ())
        .with_context(|| format!("invalid glob pattern: {pattern}"))
}
