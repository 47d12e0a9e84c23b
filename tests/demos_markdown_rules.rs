use std::error::Error;
use std::path::PathBuf;

use liveserve::config::load_and_validate;
use liveserve::watch::{build_rule_profiles, RawRulePatternSpec, WatchDefaults};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn markdown_demo_uses_default_host_and_appended_excludes() -> TestResult {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let path = manifest_dir.join("demos/markdown.toml");

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.server.port, 8000);
    assert_eq!(cfg.server.root, PathBuf::from("site"));

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

    assert!(docs.matches("docs/index.md"));
    // Rule-local exclude.
    assert!(!docs.matches("docs/notes/draft-roadmap.md"));
    // Default exclude, appended via append_default_exclude.
    assert!(!docs.matches("docs/.git/COMMIT_EDITMSG.md"));

    Ok(())
}
