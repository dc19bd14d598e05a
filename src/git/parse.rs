//! Pure parsers for git's textual output, plus the naming rules built on it.
//!
//! Every function here accepts empty or malformed input and degrades to a
//! zero/empty result instead of failing.

use regex::Regex;
use std::sync::LazyLock;

static INSERTIONS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+) insertions?\(\+\)").ok());
static DELETIONS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+) deletions?\(-\)").ok());
static VALID_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._/-]+$").ok());

/// Number of entries in `git status --porcelain` output.
#[must_use]
pub fn count_changes(porcelain: &str) -> usize {
    porcelain.lines().filter(|line| !line.trim().is_empty()).count()
}

/// `(insertions, deletions)` from the summary line of `git diff --stat`.
///
/// Either count is absent from git's summary when it is zero, so each is
/// matched on its own.
#[must_use]
pub fn parse_diff_stat(output: &str) -> (usize, usize) {
    (
        first_capture(INSERTIONS.as_ref(), output),
        first_capture(DELETIONS.as_ref(), output),
    )
}

fn first_capture(re: Option<&Regex>, text: &str) -> usize {
    re.and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// `(behind, ahead)` from `git rev-list --left-right --count <base>...<branch>`.
///
/// The left column counts commits only on `base`, the right column commits
/// only on `branch`.
#[must_use]
pub fn parse_rev_list_counts(output: &str) -> (usize, usize) {
    let mut columns = output.split_whitespace().map(|col| col.parse().unwrap_or(0));
    let behind = columns.next().unwrap_or(0);
    let ahead = columns.next().unwrap_or(0);
    (behind, ahead)
}

/// Branch names from `git branch --format=%(refname:short)`.
#[must_use]
pub fn parse_branch_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim().trim_matches('"'))
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Whether `branch` appears in plain `git branch` output such as
/// `git branch --merged main`.
///
/// Git prefixes the current branch with `*` and branches checked out in
/// other worktrees with `+`.
#[must_use]
pub fn branch_listed(output: &str, branch: &str) -> bool {
    if branch.is_empty() {
        return false;
    }

    output.lines().any(|line| {
        let name = line.trim();
        let name = name
            .strip_prefix("* ")
            .or_else(|| name.strip_prefix("+ "))
            .unwrap_or(name);
        name.trim() == branch
    })
}

/// The repository's integration branch: the first of `main` or `master` in
/// the listing, otherwise `main` whether or not it exists.
#[must_use]
pub fn main_branch(branches: &[String]) -> String {
    branches
        .iter()
        .find(|branch| *branch == "main" || *branch == "master")
        .cloned()
        .unwrap_or_else(|| "main".to_string())
}

/// `desired`, or `desired-1`, `desired-2`, ... whichever is first absent from
/// `existing`.
#[must_use]
pub fn unique_branch_name(desired: &str, existing: &[String]) -> String {
    let mut candidate = desired.to_string();
    let mut counter = 1;
    while existing.iter().any(|branch| *branch == candidate) {
        candidate = format!("{desired}-{counter}");
        counter += 1;
    }
    candidate
}

/// Whether `name` may be used as a worktree or branch name.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    VALID_NAME.as_ref().is_some_and(|re| re.is_match(name))
}
