//! Integration tests for the status command.

use anyhow::Result;
use assert_fs::prelude::*;
use predicates::prelude::*;
use test_support::CliTestEnvironment;

#[test]
fn test_status_empty() -> Result<()> {
    let env = CliTestEnvironment::new()?;

    env.run_command(&["status"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("No worktrees found for this repo"));

    Ok(())
}

#[test]
fn test_status_classifies_worktrees() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    env.run_command(&["fresh", "ready", "busy"])?.assert().success();

    // A branch with no commits of its own is already contained in main
    let ready = env.worktree_path("ready");
    env.commit_file(&ready, "ready.txt", "done")?;

    let busy = env.worktree_path("busy");
    env.commit_file(&busy, "busy.txt", "started")?;
    busy.child("busy.txt").write_str("still going")?;

    env.run_command(&["st"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("Status for demo"))
        .stdout(predicate::str::contains("✓ merged"))
        .stdout(predicate::str::contains("ready to merge (1 commit ahead)"))
        .stdout(predicate::str::contains("1 changed, 1 ahead"))
        .stdout(predicate::str::contains(
            "1 ready to merge, 1 in progress, 1 merged",
        ));

    Ok(())
}

#[test]
fn test_status_shows_diff_stat() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    env.run_command(&["edit"])?.assert().success();

    let edit = env.worktree_path("edit");
    env.commit_file(&edit, "notes.txt", "one\ntwo\n")?;
    edit.child("notes.txt").write_str("one\nthree\nfour\n")?;

    env.run_command(&["status"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("+2 -1"));

    Ok(())
}
