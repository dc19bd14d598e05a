//! One module per user-facing command.
//!
//! Handlers receive a [`Session`] carrying every collaborator they touch, so
//! tests can swap in a scripted runner, in-memory stores and a scripted
//! prompter.

pub mod clean;
pub mod config;
pub mod create;
pub mod list;
pub mod merge;
pub mod remove;
pub mod status;

use std::path::{Path, PathBuf};

use crate::error::GwtError;
use crate::git::Git;
use crate::git::parse;
use crate::selection::Prompter;
use crate::storage::{self, WorktreeRecord};
use crate::traits::{CommandRunner, ConfigStore, RecordStore};

/// Everything a command handler needs from the outside world.
pub struct Session<'a> {
    pub runner: &'a dyn CommandRunner,
    pub config: &'a dyn ConfigStore,
    pub records: &'a dyn RecordStore,
    pub prompter: &'a dyn Prompter,
    /// Directory gwt was invoked from.
    pub cwd: PathBuf,
    /// Value of `$EDITOR`.
    pub env_editor: Option<String>,
}

impl<'a> Session<'a> {
    #[must_use]
    pub fn git(&self) -> Git<'a> {
        Git::new(self.runner)
    }

    /// The repository containing the working directory.
    ///
    /// # Errors
    /// Returns [`GwtError::NotAGitRepository`] outside a repository.
    pub fn repo(&self) -> Result<Repo, GwtError> {
        let root = self.git().toplevel(&self.cwd)?;
        Ok(Repo::new(root))
    }

    /// Live worktrees created from `repo`.
    ///
    /// # Errors
    /// Returns an error if the record store cannot be read.
    pub fn repo_worktrees(&self, repo: &Repo) -> Result<Vec<WorktreeRecord>, GwtError> {
        Ok(storage::existing_for_repo(self.records.list()?, &repo.name))
    }
}

/// The repository a command runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    pub root: PathBuf,
    pub name: String,
    /// Directory that holds the repository and its sibling worktrees.
    pub parent: PathBuf,
}

impl Repo {
    pub fn new(root: PathBuf) -> Self {
        let name = root
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let parent = root
            .parent()
            .map_or_else(|| root.clone(), Path::to_path_buf);
        Self { root, name, parent }
    }

    /// `<repo>-<suffix>`, the directory name of a worktree.
    #[must_use]
    pub fn worktree_dir_name(&self, suffix: &str) -> String {
        format!("{}-{}", self.name, suffix)
    }

    /// Sibling directory `<parent>/<repo>-<suffix>`.
    #[must_use]
    pub fn worktree_path(&self, suffix: &str) -> PathBuf {
        self.parent.join(self.worktree_dir_name(suffix))
    }

    /// The integration branch; `main` when the branch listing fails.
    #[must_use]
    pub fn main_branch(&self, git: &Git<'_>) -> String {
        git.local_branches(&self.root)
            .map(|branches| parse::main_branch(&branches))
            .unwrap_or_else(|_| "main".to_string())
    }
}

/// `cd` target for a worktree, relative to where gwt was invoked.
#[must_use]
pub fn relative_to(cwd: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, cwd).unwrap_or_else(|| path.to_path_buf())
}

/// `1 worktree` / `3 worktrees`.
#[must_use]
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_paths() {
        let repo = Repo::new(PathBuf::from("/src/demo"));
        assert_eq!(repo.name, "demo");
        assert_eq!(repo.parent, PathBuf::from("/src"));
        assert_eq!(repo.worktree_dir_name("feature-x"), "demo-feature-x");
        assert_eq!(repo.worktree_path("feature-x"), PathBuf::from("/src/demo-feature-x"));
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to(Path::new("/src/demo"), Path::new("/src/demo-x")),
            PathBuf::from("../demo-x")
        );
        assert_eq!(
            relative_to(Path::new("/src/demo/app"), Path::new("/src/demo-x")),
            PathBuf::from("../../demo-x")
        );
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "worktree"), "1 worktree");
        assert_eq!(plural(0, "worktree"), "0 worktrees");
        assert_eq!(plural(3, "worktree"), "3 worktrees");
    }
}
