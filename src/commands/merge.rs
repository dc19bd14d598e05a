use anyhow::{Result, bail};
use colored::Colorize;

use crate::commands::remove::remove_worktree;
use crate::commands::{Repo, Session};
use crate::error::GwtError;
use crate::git::parse;
use crate::output;
use crate::storage::WorktreeRecord;

/// Finds a worktree by branch, directory name, or directory suffix.
fn find<'r>(worktrees: &'r [WorktreeRecord], repo: &Repo, name: &str) -> Option<&'r WorktreeRecord> {
    let dir_name = repo.worktree_dir_name(name);
    worktrees.iter().find(|wt| {
        let wt_dir = wt.dir_name();
        wt.branch == name || wt_dir == name || wt_dir == dir_name
    })
}

/// Merges a worktree's branch into the main branch, then removes the
/// worktree and deletes the branch.
///
/// # Errors
/// Returns an error if:
/// - The working directory is not inside a git repository
/// - No worktree matches `name`
/// - The worktree has uncommitted changes
/// - Checking out the main branch or the merge itself fails
/// - The worktree directory cannot be removed
pub fn merge_worktree(session: &Session<'_>, name: &str) -> Result<()> {
    let git = session.git();
    let repo = session.repo()?;
    let worktrees = session.repo_worktrees(&repo)?;

    let Some(wt) = find(&worktrees, &repo, name) else {
        return Err(GwtError::WorktreeNotFound(name.to_string()).into());
    };

    let main_branch = repo.main_branch(&git);
    output::intro(&format!(
        "Merge {} to {}",
        wt.branch.green(),
        main_branch.yellow()
    ));

    let changes = git
        .status_porcelain(&wt.path)
        .map(|porcelain| parse::count_changes(&porcelain))
        .unwrap_or(0);
    if changes > 0 {
        return Err(GwtError::UncommittedChanges.into());
    }

    let checkout_cmd = format!("git checkout {main_branch}");
    if let Err(e) = git.checkout(&repo.root, &main_branch) {
        output::step_failed("Switch", &checkout_cmd, &e.summary());
        return Err(e.into());
    }
    output::step("Switch", &checkout_cmd, &format!("switched to {main_branch}"));

    let merge_cmd = format!("git merge {}", wt.branch);
    if let Err(e) = git.merge(&repo.root, &wt.branch) {
        output::step_failed("Merge", &merge_cmd, &e.summary());
        bail!("Merge failed. Resolve conflicts manually.");
    }
    output::step("Merge", &merge_cmd, &format!("merged to {main_branch}"));

    let dir_name = wt.dir_name();
    let remove_cmd = format!("git worktree remove .../{dir_name}");
    if let Err(e) = remove_worktree(session, &wt.path, &repo.root) {
        output::step_failed("Remove", &remove_cmd, &e.summary());
        return Err(e.into());
    }
    output::step("Remove", &remove_cmd, "worktree removed");

    let branch_cmd = format!("git branch -d {}", wt.branch);
    match git.delete_branch(&repo.root, &wt.branch) {
        Ok(()) => output::step("Branch", &branch_cmd, "branch deleted"),
        Err(e) => log::debug!("branch not deleted: {}", e),
    }

    output::done(&format!("Merged and cleaned up {}", wt.branch));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{Fixture, repo_runner};
    use crate::storage::MemoryRecordStore;
    use crate::traits::RecordStore;
    use std::fs;
    use std::path::PathBuf;

    struct Scene {
        _dir: tempfile::TempDir,
        root: PathBuf,
        wt: WorktreeRecord,
    }

    fn scene() -> Scene {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo");
        let path = dir.path().join("demo-feat");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&path).unwrap();
        let wt = WorktreeRecord::new(path, "feature/login", &root, "demo");
        Scene { _dir: dir, root, wt }
    }

    fn fixture(s: &Scene, runner: crate::git::ScriptedRunner) -> Fixture {
        let mut fx = Fixture::new(runner, &s.root);
        fx.records = MemoryRecordStore::new(vec![s.wt.clone()]);
        fx
    }

    fn gwt_error(result: Result<()>) -> Option<GwtError> {
        result.err().and_then(|e| e.downcast::<GwtError>().ok())
    }

    #[test]
    fn test_merge_then_clean_up() -> Result<()> {
        let s = scene();
        let fx = fixture(&s, repo_runner(&s.root, "main\nfeature/login"));

        merge_worktree(&fx.session(), "feature/login")?;

        let calls = fx.runner.calls();
        let position = |prefix: &str| calls.iter().position(|call| call.starts_with(prefix));
        assert!(position("git checkout main") < position("git merge feature/login"));
        assert!(position("git merge feature/login") < position("git worktree remove"));
        assert!(position("git worktree remove") < position("git branch -d feature/login"));
        assert!(fx.records.list()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_lookup_by_directory_name_and_suffix() -> Result<()> {
        for name in ["demo-feat", "feat"] {
            let s = scene();
            let fx = fixture(&s, repo_runner(&s.root, "master"));

            merge_worktree(&fx.session(), name)?;
            assert!(fx.runner.called("git checkout master"));
            assert!(fx.runner.called("git merge feature/login"));
        }
        Ok(())
    }

    #[test]
    fn test_unknown_worktree() {
        let s = scene();
        let fx = fixture(&s, repo_runner(&s.root, "main"));

        let err = gwt_error(merge_worktree(&fx.session(), "nope"));
        assert!(matches!(err, Some(GwtError::WorktreeNotFound(name)) if name == "nope"));
        assert!(!fx.runner.called("git checkout"));
    }

    #[test]
    fn test_uncommitted_changes_block_merge() -> Result<()> {
        let s = scene();
        let runner = repo_runner(&s.root, "main")
            .respond_in(&s.wt.path, "git status --porcelain", " M a.rs\n?? b.rs");
        let fx = fixture(&s, runner);

        let err = gwt_error(merge_worktree(&fx.session(), "feat"));
        assert!(matches!(err, Some(GwtError::UncommittedChanges)));
        assert!(err.is_some_and(|e| e.to_string().contains("uncommitted changes")));
        assert!(!fx.runner.called("git checkout"));
        assert!(!fx.runner.called("git merge"));
        assert_eq!(fx.records.list()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_checkout_failure_stops() {
        let s = scene();
        let runner = repo_runner(&s.root, "main")
            .fail("git checkout", "error: Your local changes would be overwritten");
        let fx = fixture(&s, runner);

        let err = gwt_error(merge_worktree(&fx.session(), "feat"));
        assert!(matches!(err, Some(GwtError::GitCommandFailed { .. })));
        assert!(!fx.runner.called("git merge"));
    }

    #[test]
    fn test_merge_conflict_keeps_worktree() -> Result<()> {
        let s = scene();
        let runner = repo_runner(&s.root, "main").fail("git merge", "CONFLICT (content)");
        let fx = fixture(&s, runner);

        let result = merge_worktree(&fx.session(), "feat");
        assert!(result.is_err_and(|e| e.to_string().contains("Merge failed")));
        assert!(!fx.runner.called("git worktree remove"));
        assert!(s.wt.path.exists());
        assert_eq!(fx.records.list()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_branch_delete_failure_is_tolerated() -> Result<()> {
        let s = scene();
        let runner = repo_runner(&s.root, "main")
            .fail("git branch -d", "error: branch 'feature/login' not found");
        let fx = fixture(&s, runner);

        merge_worktree(&fx.session(), "feat")?;
        assert!(fx.records.list()?.is_empty());
        Ok(())
    }
}
