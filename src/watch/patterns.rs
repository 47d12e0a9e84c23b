// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::engine::RuleName;

/// Default watch configuration from `[default]` in the config.
///
/// This corresponds roughly to:
///
/// ```toml
/// [default]
/// exclude = ["**/.git/**", "**/*.swp"]
/// ```
#[derive(Debug, Clone, Default)]
pub struct WatchDefaults {
    pub exclude: Vec<String>,
}

/// Raw per-rule pattern specification coming from the high-level config.
///
/// This is a minimal representation that `config` can map into from its TOML
/// structs:
///
/// - `watch` is the rule-local pattern list (always present).
/// - `exclude` is an optional rule-local list.
/// - `append_default_exclude` controls whether the rule list is merged with
///   the default list.
///
/// The final, compiled patterns are computed by `build_rule_profiles`.
#[derive(Debug, Clone)]
pub struct RawRulePatternSpec {
    pub name: RuleName,
    pub watch: Vec<String>,
    pub exclude: Option<Vec<String>>,
    pub append_default_exclude: bool,
}

impl RawRulePatternSpec {
    pub fn new<N: Into<RuleName>>(
        name: N,
        watch: Vec<String>,
        exclude: Option<Vec<String>>,
        append_default_exclude: bool,
    ) -> Self {
        Self {
            name: name.into(),
            watch,
            exclude,
            append_default_exclude,
        }
    }
}

/// Compiled watch/exclude glob patterns for a single rule.
///
/// The patterns are assumed to be relative to some "project root" directory.
/// The watcher will pass relative paths (e.g. `"src/index.rst"`) into
/// `matches`.
#[derive(Clone)]
pub struct RuleWatchProfile {
    name: RuleName,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for RuleWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleWatchProfile")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl RuleWatchProfile {
    /// Name of the rule this profile belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this rule should be considered interested in the given
    /// path (relative to project root), e.g. `"src/guide/index.rst"`.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build a compiled watch profile for each rule.
///
/// Exclude resolution:
///
/// - If `append_default_exclude = true`, effective exclude list is
///   `rule.exclude + default.exclude`.
/// - Else, if `rule.exclude` is Some, use only that.
/// - Else, use `default.exclude`.
pub fn build_rule_profiles(
    defaults: &WatchDefaults,
    specs: &[RawRulePatternSpec],
) -> Result<Vec<RuleWatchProfile>> {
    let mut profiles = Vec::with_capacity(specs.len());

    for spec in specs {
        let exclude_patterns = effective_excludes(
            spec.exclude.as_ref(),
            &defaults.exclude,
            spec.append_default_exclude,
        );

        let watch_set = build_globset(&spec.watch)
            .with_context(|| format!("building watch globset for rule {}", spec.name))?;

        let exclude_set = if exclude_patterns.is_empty() {
            None
        } else {
            Some(build_globset(&exclude_patterns).with_context(|| {
                format!("building exclude globset for rule {}", spec.name)
            })?)
        };

        profiles.push(RuleWatchProfile {
            name: spec.name.clone(),
            watch_set,
            exclude_set,
        });
    }

    Ok(profiles)
}

/// Helper to decide the effective exclude list for a rule.
fn effective_excludes(
    rule_list: Option<&Vec<String>>,
    default_list: &Vec<String>,
    append_default: bool,
) -> Vec<String> {
    match (rule_list, append_default) {
        (Some(list), true) => {
            let mut combined = list.clone();
            combined.extend(default_list.iter().cloned());
            combined
        }
        (Some(list), false) => list.clone(),
        (None, _) => default_list.clone(),
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
