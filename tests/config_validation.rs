use std::error::Error;
use std::io::Write;

use liveserve::config::{load_and_validate, load_from_path};
use tempfile::NamedTempFile;

type TestResult = Result<(), Box<dyn Error>>;

fn config_file(contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn minimal_config_gets_defaults() -> TestResult {
    let file = config_file(
        r#"
[rule.docs]
watch = ["src/**/*.rst"]
cmd = "make html"
"#,
    )?;

    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.server.port, 8000);
    assert!(!cfg.server.open);
    assert!(cfg.build.initial);
    assert_eq!(cfg.build.debounce_ms, 300);
    assert!(cfg.default.exclude.is_empty());

    Ok(())
}

#[test]
fn config_without_rules_is_rejected() -> TestResult {
    let file = config_file(
        r#"
[server]
root = "_build/html"
"#,
    )?;

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.to_string().contains("at least one [rule"));

    Ok(())
}

#[test]
fn rule_without_watch_patterns_is_rejected() -> TestResult {
    let file = config_file(
        r#"
[rule.docs]
watch = []
cmd = "make html"
"#,
    )?;

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.to_string().contains("at least one `watch` pattern"));

    Ok(())
}

#[test]
fn invalid_glob_is_rejected() -> TestResult {
    let file = config_file(
        r#"
[rule.docs]
watch = ["src/**/*.{rst"]
cmd = "make html"
"#,
    )?;

    assert!(load_and_validate(file.path()).is_err());

    Ok(())
}

#[test]
fn zero_debounce_is_rejected() -> TestResult {
    let file = config_file(
        r#"
[build]
debounce_ms = 0

[rule.docs]
watch = ["src/**/*.rst"]
cmd = "make html"
"#,
    )?;

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.to_string().contains("debounce_ms"));

    Ok(())
}

#[test]
fn empty_command_is_rejected() -> TestResult {
    let file = config_file(
        r#"
[rule.docs]
watch = ["src/**/*.rst"]
cmd = "  "
"#,
    )?;

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.to_string().contains("empty `cmd`"));

    Ok(())
}

#[test]
fn load_from_path_skips_semantic_validation() -> TestResult {
    // No rules at all: deserializes fine, only validation rejects it.
    let file = config_file(
        r#"
[server]
port = 9000
"#,
    )?;

    let cfg = load_from_path(file.path())?;
    assert_eq!(cfg.server.port, 9000);
    assert!(cfg.rule.is_empty());

    Ok(())
}
