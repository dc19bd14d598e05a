use anyhow::Result;
use colored::{Color, Colorize};
use std::path::Path;

use crate::commands::{Session, plural};
use crate::git::{Git, parse};
use crate::output;

/// Where a worktree stands relative to the main branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Merged,
    /// Clean and ahead of main.
    ReadyToMerge,
    InProgress,
}

/// Working-tree and branch state of one worktree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    pub changes: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub ahead: usize,
    pub behind: usize,
    pub merged: bool,
}

impl WorktreeStatus {
    /// Queries git for the worktree at `path`. Each query that fails
    /// contributes zero (or not merged) instead of an error.
    #[must_use]
    pub fn compute(git: &Git<'_>, path: &Path, root: &Path, main_branch: &str) -> Self {
        let changes = git
            .status_porcelain(path)
            .map(|porcelain| parse::count_changes(&porcelain))
            .unwrap_or(0);
        let (insertions, deletions) = git
            .diff_stat(path)
            .map(|stat| parse::parse_diff_stat(&stat))
            .unwrap_or((0, 0));

        let branch = git.current_branch(path).ok().filter(|b| !b.is_empty());
        let (behind, ahead) = branch
            .as_deref()
            .and_then(|b| git.rev_list_counts(path, main_branch, b).ok())
            .map_or((0, 0), |counts| parse::parse_rev_list_counts(&counts));
        let merged = branch.as_deref().is_some_and(|b| {
            git.merged_branches(root, main_branch)
                .is_ok_and(|listing| parse::branch_listed(&listing, b))
        });

        Self {
            changes,
            insertions,
            deletions,
            ahead,
            behind,
            merged,
        }
    }

    #[must_use]
    pub fn classify(&self) -> Classification {
        if self.merged {
            Classification::Merged
        } else if self.changes == 0 && self.ahead > 0 {
            Classification::ReadyToMerge
        } else {
            Classification::InProgress
        }
    }

    /// One-line description, e.g. `3 changed, 2 ahead`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.classify() {
            Classification::Merged => "✓ merged".to_string(),
            Classification::ReadyToMerge => format!(
                "ready to merge ({} ahead)",
                plural(self.ahead, "commit")
            ),
            Classification::InProgress => {
                let mut parts = Vec::new();
                if self.changes > 0 {
                    parts.push(format!("{} changed", self.changes));
                }
                if self.ahead > 0 {
                    parts.push(format!("{} ahead", self.ahead));
                }
                if self.behind > 0 {
                    parts.push(format!("{} behind", self.behind));
                }
                if parts.is_empty() {
                    "no changes".to_string()
                } else {
                    parts.join(", ")
                }
            }
        }
    }

    fn color(&self) -> Color {
        match self.classify() {
            Classification::Merged => Color::BrightBlack,
            Classification::ReadyToMerge => Color::Green,
            Classification::InProgress if self.changes > 0 => Color::Yellow,
            Classification::InProgress => Color::BrightBlack,
        }
    }
}

/// Counts per classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub ready_to_merge: usize,
    pub in_progress: usize,
    pub merged: usize,
}

impl Tally {
    pub fn add(&mut self, classification: Classification) {
        match classification {
            Classification::Merged => self.merged += 1,
            Classification::ReadyToMerge => self.ready_to_merge += 1,
            Classification::InProgress => self.in_progress += 1,
        }
    }

    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.ready_to_merge > 0 {
            parts.push(format!("{} ready to merge", self.ready_to_merge).green().to_string());
        }
        if self.in_progress > 0 {
            parts.push(format!("{} in progress", self.in_progress).yellow().to_string());
        }
        if self.merged > 0 {
            parts.push(format!("{} merged", self.merged).bright_black().to_string());
        }
        if parts.is_empty() {
            "no worktrees".bright_black().to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Prints the state of every live worktree of the current repository.
///
/// # Errors
/// Returns an error if the working directory is not inside a git repository
/// or the record store cannot be read.
pub fn status_worktrees(session: &Session<'_>) -> Result<Tally> {
    let git = session.git();
    let repo = session.repo()?;
    let worktrees = session.repo_worktrees(&repo)?;

    if worktrees.is_empty() {
        println!("{}", "No worktrees found for this repo".bright_black());
        return Ok(Tally::default());
    }

    let main_branch = repo.main_branch(&git);
    output::intro(&format!("Status for {}", repo.name.cyan()));

    let mut tally = Tally::default();
    for wt in &worktrees {
        let status = WorktreeStatus::compute(&git, &wt.path, &repo.root, &main_branch);
        tally.add(status.classify());

        let color = status.color();
        let diff = if status.insertions > 0 || status.deletions > 0 {
            format!(
                "  {} {}",
                format!("+{}", status.insertions).green(),
                format!("-{}", status.deletions).red()
            )
        } else {
            String::new()
        };

        println!("│");
        println!("│  {}  {}{}", "◆".color(color), wt.branch.color(color), diff);
        println!("│  {}  {}", "└".bright_black(), status.describe().color(color));
    }

    println!("│");
    println!("└  {}", tally.summary());
    println!();

    Ok(tally)
}
