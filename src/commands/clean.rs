use anyhow::Result;
use colored::Colorize;

use crate::commands::remove::remove_worktree;
use crate::commands::status::WorktreeStatus;
use crate::commands::{Session, plural};
use crate::output;

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    /// Remove every worktree of the repository, not just merged ones.
    pub all: bool,
    /// Skip the confirmation prompt.
    pub yes: bool,
}

/// Outcome of a clean run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cleaned {
    pub removed: usize,
    pub failed: usize,
}

/// Removes merged (or, with `all`, every) worktree of the current repository
/// after a single confirmation.
///
/// Individual removal failures are reported and counted; they do not stop
/// the remaining removals.
///
/// # Errors
/// Returns an error if the working directory is not inside a git repository,
/// the record store cannot be read, or prompting fails.
pub fn clean_worktrees(session: &Session<'_>, opts: CleanOptions) -> Result<Cleaned> {
    let git = session.git();
    let repo = session.repo()?;
    let worktrees = session.repo_worktrees(&repo)?;

    if worktrees.is_empty() {
        println!("{}", "No worktrees found for this repo".bright_black());
        return Ok(Cleaned::default());
    }

    let main_branch = repo.main_branch(&git);
    output::intro(if opts.all {
        "Clean All Worktrees"
    } else {
        "Clean Merged Worktrees"
    });

    let to_remove: Vec<_> = if opts.all {
        worktrees
    } else {
        worktrees
            .into_iter()
            .filter(|wt| WorktreeStatus::compute(&git, &wt.path, &repo.root, &main_branch).merged)
            .collect()
    };

    if to_remove.is_empty() {
        output::outro("No worktrees to clean");
        return Ok(Cleaned::default());
    }

    println!("│");
    println!("│  {}", "Will remove:".yellow());
    for wt in &to_remove {
        println!(
            "│  {}  {} {}",
            "•".bright_black(),
            wt.branch,
            wt.dir_name().bright_black()
        );
    }

    if !opts.yes {
        let message = format!("Remove {}?", plural(to_remove.len(), "worktree"));
        if session.prompter.confirm(&message, true)? != Some(true) {
            output::outro("Cancelled");
            return Ok(Cleaned::default());
        }
    }

    let mut cleaned = Cleaned::default();
    for wt in &to_remove {
        let name = wt.dir_name();
        match remove_worktree(session, &wt.path, &wt.repo_root) {
            Ok(()) => {
                cleaned.removed += 1;
                output::step(&format!("Removed {name}"), "", &wt.path.to_string_lossy());
            }
            Err(e) => {
                cleaned.failed += 1;
                output::step_failed(&format!("Failed {name}"), "", &e.summary());
            }
        }
    }

    let mut summary = format!("Removed {}", plural(cleaned.removed, "worktree"));
    if cleaned.failed > 0 {
        summary.push_str(&format!(", {} failed", cleaned.failed));
    }
    output::done(&summary);

    Ok(cleaned)
}
