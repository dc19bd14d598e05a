use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::commands::Session;
use crate::error::GwtError;
use crate::output;

/// Removes a worktree directory and forgets its record.
///
/// `git worktree remove --force` runs in `root` when that directory still
/// exists; if git refuses, or the repository is gone, the directory is
/// deleted outright. The record is only dropped once one of the two worked.
///
/// # Errors
/// Returns an error if the directory cannot be deleted or the record store
/// cannot be written.
pub fn remove_worktree(session: &Session<'_>, path: &Path, root: &Path) -> Result<(), GwtError> {
    let removed_by_git = root.exists()
        && session
            .git()
            .worktree_remove(root, path)
            .inspect_err(|e| log::debug!("git worktree remove failed, deleting directory: {}", e))
            .is_ok();

    if !removed_by_git && path.exists() {
        fs::remove_dir_all(path)?;
    }

    session.records.remove(path)?;
    Ok(())
}

/// Interactively removes worktrees of the current repository, one at a time,
/// until the list is empty or the user backs out.
///
/// # Errors
/// Returns an error if the working directory is not inside a git repository
/// or a selected worktree cannot be removed.
pub fn remove_worktrees(session: &Session<'_>) -> Result<()> {
    output::intro("Remove Worktree");
    let repo = session.repo()?;

    loop {
        let worktrees = session.repo_worktrees(&repo)?;
        if worktrees.is_empty() {
            output::outro(&format!("No worktrees found for {}", repo.name));
            return Ok(());
        }

        let options: Vec<String> = worktrees
            .iter()
            .map(|wt| format!("{} {}", wt.branch, wt.dir_name()))
            .collect();
        let Some(record) = session
            .prompter
            .search("Search worktree:", &options)?
            .and_then(|index| worktrees.get(index))
        else {
            output::outro("Done");
            return Ok(());
        };

        let name = record.dir_name();
        match session.prompter.confirm(&format!("Remove {name}?"), true)? {
            None => {
                output::outro("Done");
                return Ok(());
            }
            Some(false) => continue,
            Some(true) => {}
        }

        let path = record.path.to_string_lossy();
        if let Err(e) = remove_worktree(session, &record.path, &record.repo_root) {
            output::step_failed(&format!("Failed to remove {name}"), "", &path);
            return Err(e.into());
        }
        output::step(&format!("Removed {name}"), "", &path);
    }
}
