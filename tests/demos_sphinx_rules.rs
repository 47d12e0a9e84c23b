use std::error::Error;
use std::path::PathBuf;

use liveserve::config::load_and_validate;
use liveserve::watch::{build_rule_profiles, RawRulePatternSpec, WatchDefaults};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn sphinx_demo_parses_with_expected_server_settings() -> TestResult {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let path = manifest_dir.join("demos/sphinx-rst.toml");

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 8000);
    assert_eq!(cfg.server.root, PathBuf::from("_build/html"));
    assert!(!cfg.server.open);

    assert!(cfg.build.initial);
    assert_eq!(cfg.build.debounce_ms, 300);

    let docs = cfg.rule.get("docs").expect("docs rule should exist");
    assert_eq!(docs.cmd, "make html");
    assert_eq!(docs.watch, vec!["src/**/*.rst".to_string()]);

    Ok(())
}

#[test]
fn sphinx_rule_matches_rst_sources_only() -> TestResult {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let path = manifest_dir.join("demos/sphinx-rst.toml");

    let cfg = load_and_validate(&path)?;
    let defaults = WatchDefaults {
        exclude: cfg.default.exclude.clone(),
    };

    let specs: Vec<RawRulePatternSpec> = cfg
        .rule
        .iter()
        .map(|(name, r)| RawRulePatternSpec {
            name: name.clone(),
            watch: r.watch.clone(),
            exclude: r.exclude.clone(),
            append_default_exclude: r.append_default_exclude,
        })
        .collect();

    let profiles = build_rule_profiles(&defaults, &specs)?;
    let docs = profiles.iter().find(|p| p.name() == "docs").unwrap();

    assert!(docs.matches("src/index.rst"));
    assert!(docs.matches("src/guide/install.rst"));

    // Unrelated extensions and paths outside the watched tree do not trigger.
    assert!(!docs.matches("src/conf.py"));
    assert!(!docs.matches("README.rst"));
    assert!(!docs.matches("src/index.rst.swp"));

    Ok(())
}
