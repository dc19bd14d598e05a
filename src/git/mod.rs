//! Git access through the `git` binary.
//!
//! [`SystemRunner`] spawns processes, [`Git`] turns the handful of git
//! invocations gwt needs into typed calls, and [`parse`] interprets their
//! output. [`ScriptedRunner`] stands in for the real binary in tests.

pub mod parse;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use crate::error::{CommandError, GwtError};
use crate::traits::CommandRunner;

fn command_line(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Runs real processes.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<String, CommandError> {
        let cmd_str = command_line(program, args);
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        log::debug!("$ {}", cmd_str);
        let t0 = Instant::now();
        let output = cmd
            .output()
            .map_err(|e| CommandError::new(&cmd_str, e.to_string()))?;
        log::debug!(
            "cmd=\"{}\" dur={:.1}ms ok={}",
            cmd_str,
            t0.elapsed().as_secs_f64() * 1000.0,
            output.status.success()
        );

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            Err(CommandError::new(cmd_str, message))
        }
    }

    fn run_attached(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<(), CommandError> {
        let cmd_str = command_line(program, args);
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        log::debug!("$ {} (attached)", cmd_str);
        let status = cmd
            .status()
            .map_err(|e| CommandError::new(&cmd_str, e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::new(cmd_str, format!("exited with {}", status)))
        }
    }
}

/// Typed git operations on top of a [`CommandRunner`].
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, CommandError> {
        self.runner.run("git", args, Some(dir))
    }

    /// Top-level directory of the repository containing `cwd`.
    ///
    /// # Errors
    /// Returns [`GwtError::NotAGitRepository`] if `cwd` is not inside a
    /// work tree.
    pub fn toplevel(&self, cwd: &Path) -> Result<PathBuf, GwtError> {
        match self.run(cwd, &["rev-parse", "--show-toplevel"]) {
            Ok(root) if !root.is_empty() => Ok(PathBuf::from(root)),
            Ok(_) => Err(GwtError::NotAGitRepository),
            Err(e) => {
                log::debug!("repository discovery failed: {}", e);
                Err(GwtError::NotAGitRepository)
            }
        }
    }

    /// # Errors
    /// Returns an error if git fails.
    pub fn current_branch(&self, dir: &Path) -> Result<String, GwtError> {
        Ok(self.run(dir, &["branch", "--show-current"])?)
    }

    /// # Errors
    /// Returns an error if git fails.
    pub fn local_branches(&self, root: &Path) -> Result<Vec<String>, GwtError> {
        let output = self.run(root, &["branch", "--format=%(refname:short)"])?;
        Ok(parse::parse_branch_list(&output))
    }

    /// # Errors
    /// Returns an error if git fails.
    pub fn status_porcelain(&self, dir: &Path) -> Result<String, GwtError> {
        Ok(self.run(dir, &["status", "--porcelain"])?)
    }

    /// Whether any remote is configured. A failing `git remote` counts as none.
    #[must_use]
    pub fn has_remote(&self, root: &Path) -> bool {
        self.run(root, &["remote"])
            .map(|remotes| !remotes.trim().is_empty())
            .unwrap_or(false)
    }

    /// # Errors
    /// Returns [`GwtError::PullFailed`] with git's last stderr line.
    pub fn pull_rebase(&self, root: &Path, branch: &str) -> Result<(), GwtError> {
        self.run(root, &["pull", "--rebase", "origin", branch])
            .map(drop)
            .map_err(|e| GwtError::PullFailed(e.summary().to_string()))
    }

    /// # Errors
    /// Returns an error if git fails.
    pub fn stash(&self, root: &Path) -> Result<(), GwtError> {
        self.run(root, &["stash"])?;
        Ok(())
    }

    /// # Errors
    /// Returns an error if git fails.
    pub fn checkout(&self, root: &Path, branch: &str) -> Result<(), GwtError> {
        self.run(root, &["checkout", branch])?;
        Ok(())
    }

    /// # Errors
    /// Returns an error if git fails.
    pub fn worktree_prune(&self, root: &Path) -> Result<(), GwtError> {
        self.run(root, &["worktree", "prune"])?;
        Ok(())
    }

    /// Creates `branch` from `base` and checks it out at `path`.
    ///
    /// # Errors
    /// Returns [`GwtError::GitCommandFailed`] if git refuses.
    pub fn worktree_add(
        &self,
        root: &Path,
        branch: &str,
        path: &Path,
        base: &str,
    ) -> Result<(), GwtError> {
        let path = path.to_string_lossy();
        self.run(root, &["worktree", "add", "-b", branch, &path, base])?;
        Ok(())
    }

    /// # Errors
    /// Returns an error if git fails.
    pub fn worktree_remove(&self, root: &Path, path: &Path) -> Result<(), GwtError> {
        let path = path.to_string_lossy();
        self.run(root, &["worktree", "remove", &path, "--force"])?;
        Ok(())
    }

    /// # Errors
    /// Returns an error if the branch is missing or not fully merged.
    pub fn delete_branch(&self, root: &Path, branch: &str) -> Result<(), GwtError> {
        self.run(root, &["branch", "-d", branch])?;
        Ok(())
    }

    /// Raw `git branch --merged <base>` output.
    ///
    /// # Errors
    /// Returns an error if git fails.
    pub fn merged_branches(&self, root: &Path, base: &str) -> Result<String, GwtError> {
        Ok(self.run(root, &["branch", "--merged", base])?)
    }

    /// # Errors
    /// Returns an error if git fails.
    pub fn diff_stat(&self, dir: &Path) -> Result<String, GwtError> {
        Ok(self.run(dir, &["diff", "--stat", "HEAD"])?)
    }

    /// Raw `git rev-list --left-right --count <base>...<branch>` output.
    ///
    /// # Errors
    /// Returns an error if git fails.
    pub fn rev_list_counts(&self, dir: &Path, base: &str, branch: &str) -> Result<String, GwtError> {
        let range = format!("{base}...{branch}");
        Ok(self.run(dir, &["rev-list", "--left-right", "--count", &range])?)
    }

    /// # Errors
    /// Returns [`GwtError::GitCommandFailed`] on conflicts or other failures.
    pub fn merge(&self, root: &Path, branch: &str) -> Result<(), GwtError> {
        self.run(root, &["merge", branch])?;
        Ok(())
    }
}

struct Response {
    cwd: Option<PathBuf>,
    prefix: String,
    result: Result<String, String>,
}

/// A [`CommandRunner`] that records every invocation and replies from a script.
///
/// Responses are matched on the command-line prefix (and optionally the
/// working directory); the most recently added match wins. Unmatched commands
/// succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: Vec<Response>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn respond(mut self, prefix: &str, stdout: &str) -> Self {
        self.responses.push(Response {
            cwd: None,
            prefix: prefix.to_string(),
            result: Ok(stdout.to_string()),
        });
        self
    }

    #[must_use]
    pub fn respond_in(mut self, dir: &Path, prefix: &str, stdout: &str) -> Self {
        self.responses.push(Response {
            cwd: Some(dir.to_path_buf()),
            prefix: prefix.to_string(),
            result: Ok(stdout.to_string()),
        });
        self
    }

    #[must_use]
    pub fn fail(mut self, prefix: &str, stderr: &str) -> Self {
        self.responses.push(Response {
            cwd: None,
            prefix: prefix.to_string(),
            result: Err(stderr.to_string()),
        });
        self
    }

    /// Every command line run so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    #[must_use]
    pub fn called(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|call| call.starts_with(prefix))
    }

    fn reply(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<String, CommandError> {
        let cmd_str = command_line(program, args);
        self.calls.borrow_mut().push(cmd_str.clone());

        let response = self.responses.iter().rev().find(|response| {
            cmd_str.starts_with(&response.prefix)
                && response
                    .cwd
                    .as_deref()
                    .is_none_or(|dir| cwd == Some(dir))
        });

        match response.map(|response| &response.result) {
            Some(Ok(stdout)) => Ok(stdout.clone()),
            Some(Err(stderr)) => Err(CommandError::new(cmd_str, stderr.clone())),
            None => Ok(String::new()),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<String, CommandError> {
        self.reply(program, args, cwd)
    }

    fn run_attached(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<(), CommandError> {
        self.reply(program, args, cwd).map(drop)
    }
}
