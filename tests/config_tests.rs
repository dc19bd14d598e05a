//! Integration tests for the config command.

use anyhow::Result;
use predicates::prelude::*;
use test_support::CliTestEnvironment;

#[test]
fn test_config_path() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    let expected = env.config_dir.path().join("config.json");

    env.run_command(&["config", "path"])?
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.to_string_lossy()));

    Ok(())
}

#[test]
fn test_config_set_and_show() -> Result<()> {
    let env = CliTestEnvironment::new()?;

    env.run_command(&["config", "set", "lastPm", "bun"])?
        .assert()
        .success();

    env.run_command(&["config", "show"])?
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""lastPm": "bun""#))
        .stdout(predicate::str::contains(r#""editor": "none""#));

    Ok(())
}

#[test]
fn test_config_rejects_invalid_value() -> Result<()> {
    let env = CliTestEnvironment::new()?;

    env.run_command(&["config", "set", "editor", "emacs"])?
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid value 'emacs'"));

    env.run_command(&["config", "show"])?
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""editor": "none""#));

    Ok(())
}

#[test]
fn test_config_reset() -> Result<()> {
    let env = CliTestEnvironment::new()?;

    env.run_command(&["config", "reset"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("Config reset to defaults"));

    env.run_command(&["config", "show"])?
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""editor": "code""#))
        .stdout(predicate::str::contains(r#""installDeps": true"#))
        .stdout(predicate::str::contains(r#""lastPm": null"#));

    Ok(())
}

#[test]
fn test_config_open_without_editor_prints_path() -> Result<()> {
    let env = CliTestEnvironment::new()?;

    env.run_command(&["config"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));

    Ok(())
}
