use anyhow::Result;
use colored::Colorize;

use crate::commands::{Session, plural};
use crate::output;

/// Prints the live worktrees of the current repository.
///
/// # Errors
/// Returns an error if the working directory is not inside a git repository
/// or the record store cannot be read.
pub fn list_worktrees(session: &Session<'_>) -> Result<()> {
    let repo = session.repo()?;
    let worktrees = session.repo_worktrees(&repo)?;

    if worktrees.is_empty() {
        println!("{}", "No worktrees found for this repo".bright_black());
        return Ok(());
    }

    output::intro(&format!("Worktrees for {}", repo.name.cyan()));
    for wt in &worktrees {
        output::step(&wt.branch, "", &wt.path.to_string_lossy());
    }
    output::outro(&plural(worktrees.len(), "worktree"));

    Ok(())
}
