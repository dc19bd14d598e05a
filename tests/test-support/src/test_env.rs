#![allow(clippy::unwrap_used)] // Tests use unwrap for simplicity

use anyhow::{Context, Result};
use assert_fs::TempDir;
use assert_fs::prelude::*;

use std::process::Command;

/// Name of the repository every environment starts with.
pub const REPO_NAME: &str = "demo";

/// A real git repository plus isolated gwt config and data directories
///
/// Layout inside the temp dir:
///
/// ```text
/// work/demo          the repository (branch main, one commit)
/// work/demo-<name>   worktrees created by gwt
/// config/            GWTREE_CONFIG_DIR
/// data/              GWTREE_DATA_DIR
/// ```
pub struct CliTestEnvironment {
    pub work_dir: assert_fs::fixture::ChildPath,
    pub repo_dir: assert_fs::fixture::ChildPath,
    pub config_dir: assert_fs::fixture::ChildPath,
    pub data_dir: assert_fs::fixture::ChildPath,
    _temp_dir: TempDir, // Keep temp_dir private to ensure cleanup, but don't expose it
}

impl CliTestEnvironment {
    /// Creates a new test environment with a real git repository
    ///
    /// The editor is disabled and dependency installs are off so commands
    /// never launch anything besides git.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Failed to create temporary directory
    /// - Failed to initialize git repository
    /// - Failed to configure git settings
    /// - Failed to create initial commit
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temporary directory")?;
        let work_dir = temp_dir.child("work");
        let repo_dir = work_dir.child(REPO_NAME);
        let config_dir = temp_dir.child("config");
        let data_dir = temp_dir.child("data");

        repo_dir.create_dir_all()?;
        config_dir.create_dir_all()?;
        data_dir.create_dir_all()?;

        // Initialize real git repo
        Self::run_git_command(&repo_dir, &["init"])?;
        Self::run_git_command(&repo_dir, &["config", "user.name", "Test User"])?;
        Self::run_git_command(&repo_dir, &["config", "user.email", "test@example.com"])?;

        // Create initial commit
        repo_dir.child("README.md").write_str("# Test Repo")?;
        Self::run_git_command(&repo_dir, &["add", "."])?;
        Self::run_git_command(&repo_dir, &["commit", "-m", "Initial commit"])?;

        // Ensure we have a main branch (some git versions default to 'master')
        Self::run_git_command(&repo_dir, &["branch", "-M", "main"])?;

        config_dir
            .child("config.json")
            .write_str(r#"{"editor":"none","installDeps":false,"lastPm":null}"#)?;

        Ok(Self {
            work_dir,
            repo_dir,
            config_dir,
            data_dir,
            _temp_dir: temp_dir,
        })
    }

    /// Run a git command in the repository directory
    fn run_git_command(repo_path: &assert_fs::fixture::ChildPath, args: &[&str]) -> Result<()> {
        let output = Command::new("git")
            .args(args)
            .current_dir(repo_path.path())
            .output()
            .context("Failed to execute git command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git command failed: {}", stderr);
        }

        Ok(())
    }

    /// Runs git in `dir` and returns its trimmed stdout
    ///
    /// # Errors
    /// Returns an error if git fails
    pub fn git(&self, dir: &assert_fs::fixture::ChildPath, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir.path())
            .output()
            .context("Failed to execute git command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git command failed: {}", stderr);
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Commits a new file in `dir`
    ///
    /// # Errors
    /// Returns an error if writing the file or committing fails
    pub fn commit_file(
        &self,
        dir: &assert_fs::fixture::ChildPath,
        name: &str,
        content: &str,
    ) -> Result<()> {
        dir.child(name).write_str(content)?;
        self.git(dir, &["add", name])?;
        self.git(dir, &["commit", "-m", &format!("Add {name}")])?;
        Ok(())
    }

    /// Execute a non-interactive gwt command from the repository directory
    ///
    /// # Errors
    /// Returns an error if the command setup fails
    pub fn run_command(&self, args: &[&str]) -> Result<assert_cmd::Command> {
        self.run_command_in(&self.repo_dir, args)
    }

    /// Execute a gwt command from an arbitrary directory
    ///
    /// # Errors
    /// Returns an error if the command setup fails
    pub fn run_command_in(
        &self,
        dir: &assert_fs::fixture::ChildPath,
        args: &[&str],
    ) -> Result<assert_cmd::Command> {
        let mut cmd =
            assert_cmd::Command::cargo_bin("gwt").context("Failed to find gwt binary")?;

        cmd.current_dir(dir.path())
            .env("GWTREE_CONFIG_DIR", self.config_dir.path())
            .env("GWTREE_DATA_DIR", self.data_dir.path())
            .env("NO_COLOR", "1")
            .env_remove("EDITOR")
            .env_remove("GWT_LOG");

        cmd.args(args);
        Ok(cmd)
    }

    /// Path of the worktree gwt creates for `name`
    pub fn worktree_path(&self, name: &str) -> assert_fs::fixture::ChildPath {
        self.work_dir.child(format!("{REPO_NAME}-{name}"))
    }

    /// Records currently persisted in `worktrees.json`
    ///
    /// # Errors
    /// Returns an error if the store exists but cannot be parsed
    pub fn records(&self) -> Result<Vec<serde_json::Value>> {
        let path = self.data_dir.child("worktrees.json");
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path.path())?;
        let data: serde_json::Value = serde_json::from_str(&content)?;
        Ok(data["worktrees"].as_array().cloned().unwrap_or_default())
    }

    /// Branches of the records currently persisted
    ///
    /// # Errors
    /// Returns an error if the store cannot be read
    pub fn recorded_branches(&self) -> Result<Vec<String>> {
        Ok(self
            .records()?
            .iter()
            .filter_map(|record| record["branch"].as_str().map(ToString::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predicates::prelude::*;

    #[test]
    fn test_cli_test_environment_creation() -> Result<()> {
        let env = CliTestEnvironment::new()?;

        // Test that git repo was created properly
        env.repo_dir.assert(predicate::path::is_dir());
        env.repo_dir.child(".git").assert(predicate::path::exists());
        env.repo_dir
            .child("README.md")
            .assert(predicate::str::contains("# Test Repo"));

        env.config_dir
            .child("config.json")
            .assert(predicate::str::contains("\"editor\":\"none\""));
        assert!(env.records()?.is_empty());
        assert_eq!(env.git(&env.repo_dir, &["branch", "--show-current"])?, "main");

        Ok(())
    }

    #[test]
    fn test_worktree_path_is_sibling() -> Result<()> {
        let env = CliTestEnvironment::new()?;

        let path = env.worktree_path("feature-x");
        assert_eq!(path.path().parent(), env.repo_dir.path().parent());
        assert!(path.path().ends_with("demo-feature-x"));

        Ok(())
    }
}
