use anyhow::Result;
use std::path::Path;

use crate::commands::{Repo, Session, plural, relative_to};
use crate::config::{Config, Editor};
use crate::editor::EditorCommand;
use crate::error::GwtError;
use crate::git::parse;
use crate::install;
use crate::output;
use crate::storage::WorktreeRecord;

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    /// Take the default answer at every prompt.
    pub yes: bool,
    /// Do not open the editor afterwards.
    pub no_editor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Proceed,
    Ignore,
    Cancel,
}

/// Creates one worktree next to the repository, prompting for anything not
/// given on the command line.
///
/// # Errors
/// Returns an error if:
/// - The working directory is not inside a git repository
/// - The target directory already exists
/// - `git worktree add` (or a requested stash/checkout) fails
/// - Prompting is impossible (no terminal) while an answer is required
pub fn create_worktree(session: &Session<'_>, name: Option<&str>, opts: CreateOptions) -> Result<()> {
    let settings = session.config.get();
    output::intro("Create Git Worktree");

    let git = session.git();
    let repo = session.repo()?;
    let current_branch = git.current_branch(&repo.root)?;
    let branches = git.local_branches(&repo.root)?;
    let main_branch = parse::main_branch(&branches);

    let Some((suffix, branch_name)) = resolve_names(session, &repo, name)? else {
        return cancelled();
    };

    let worktree_name = repo.worktree_dir_name(&suffix);
    let worktree_path = repo.parent.join(&worktree_name);
    if worktree_path.exists() {
        return Err(GwtError::DirectoryAlreadyExists(worktree_path).into());
    }

    let porcelain = git.status_porcelain(&repo.root)?;
    if parse::count_changes(&porcelain) > 0 {
        let resolution = resolve(session, opts, "Uncommitted changes detected:", &[
            "Stash changes".to_string(),
            "Ignore and continue".to_string(),
            "Cancel".to_string(),
        ])?;
        match resolution {
            Resolution::Proceed => {
                git.stash(&repo.root)?;
                output::step("Stash", "git stash", "saves uncommitted changes");
            }
            Resolution::Ignore => {}
            Resolution::Cancel => return cancelled(),
        }
    }

    if current_branch != main_branch {
        let message = format!("Not on {main_branch} (currently on {current_branch}):");
        let resolution = resolve(session, opts, &message, &[
            format!("Switch to {main_branch}"),
            "Ignore and continue".to_string(),
            "Cancel".to_string(),
        ])?;
        match resolution {
            Resolution::Proceed => {
                git.checkout(&repo.root, &main_branch)?;
                output::step(
                    "Switch",
                    &format!("git checkout {main_branch}"),
                    "switches to base branch",
                );
            }
            Resolution::Ignore => {}
            Resolution::Cancel => return cancelled(),
        }
    }

    if git.has_remote(&repo.root) {
        let message = format!("Pull latest from origin/{main_branch}?");
        let resolution = resolve(session, opts, &message, &[
            "Yes, git pull --rebase".to_string(),
            "Skip".to_string(),
        ])?;
        match resolution {
            Resolution::Proceed => {
                let pull_cmd = format!("git pull --rebase origin {main_branch}");
                match git.pull_rebase(&repo.root, &main_branch) {
                    Ok(()) => output::step("Pull", &pull_cmd, "fetches latest changes"),
                    Err(GwtError::PullFailed(reason)) => output::step_failed("Pull", &pull_cmd, &reason),
                    Err(e) => output::step_failed("Pull", &pull_cmd, &e.summary()),
                }
            }
            Resolution::Ignore => {}
            Resolution::Cancel => return cancelled(),
        }
    }

    let branch = parse::unique_branch_name(&branch_name, &branches);
    output::note(&format!(
        "Creating {worktree_name} branch {branch} from {main_branch}"
    ));

    prune(session, &repo);

    let add_short = format!("git worktree add -b {branch} .../{worktree_name} {main_branch}");
    if let Err(e) = git.worktree_add(&repo.root, &branch, &worktree_path, &main_branch) {
        if e.to_string().contains("already registered") {
            output::step_failed("Create", &add_short, "worktree registered but missing");
        } else {
            output::step_failed("Create", &add_short, &e.summary());
        }
        return Err(e.into());
    }
    output::step("Create", &add_short, &worktree_path.to_string_lossy());

    session.records.add(WorktreeRecord::new(
        &worktree_path,
        &branch,
        &repo.root,
        &repo.name,
    ))?;

    install_step(session, &worktree_path, &settings, None);

    if !opts.no_editor {
        open_editor_step(session, &worktree_path, &worktree_name, settings.editor);
    }

    output::done(&format!(
        "cd {}",
        relative_to(&session.cwd, &worktree_path).display()
    ));
    Ok(())
}

/// Creates one worktree per name without prompting.
///
/// Existing directories are skipped and a failure for one name does not stop
/// the others.
///
/// # Errors
/// Returns an error if the working directory is not inside a git repository
/// or the record store cannot be written.
pub fn create_worktrees(session: &Session<'_>, names: &[String], opts: CreateOptions) -> Result<()> {
    let settings = session.config.get();
    output::intro(&format!("Create {} Git Worktrees", names.len()));

    let git = session.git();
    let repo = session.repo()?;
    let mut branches = git.local_branches(&repo.root)?;
    let main_branch = parse::main_branch(&branches);

    prune(session, &repo);

    let mut created = Vec::new();
    let mut skipped = 0;
    let mut failed = 0;

    for name in names {
        let worktree_name = repo.worktree_dir_name(name);
        let worktree_path = repo.parent.join(&worktree_name);
        if worktree_path.exists() {
            output::step_skipped("Skip", &worktree_name, "already exists");
            skipped += 1;
            continue;
        }

        let branch = parse::unique_branch_name(name, &branches);
        branches.push(branch.clone());

        let add_short = format!("git worktree add -b {branch} .../{worktree_name}");
        if let Err(e) = git.worktree_add(&repo.root, &branch, &worktree_path, &main_branch) {
            output::step_failed("Failed", &worktree_name, &e.summary());
            failed += 1;
            continue;
        }
        output::step("Create", &add_short, &worktree_path.to_string_lossy());

        session.records.add(WorktreeRecord::new(
            &worktree_path,
            &branch,
            &repo.root,
            &repo.name,
        ))?;

        install_step(session, &worktree_path, &settings, Some(&worktree_name));

        // GUI editors only.
        if !opts.no_editor && matches!(settings.editor, Editor::Code | Editor::Cursor) {
            open_editor_step(session, &worktree_path, &worktree_name, settings.editor);
        }

        created.push(worktree_path);
    }

    if created.is_empty() {
        output::outro(&format!(
            "No worktrees created ({skipped} skipped, {failed} failed)"
        ));
        return Ok(());
    }

    let mut summary = format!("Created {}", plural(created.len(), "worktree"));
    if skipped > 0 {
        summary.push_str(&format!(", {skipped} skipped"));
    }
    if failed > 0 {
        summary.push_str(&format!(", {failed} failed"));
    }
    output::done(&summary);

    println!("   cd commands:");
    for path in &created {
        println!("   cd {}", relative_to(&session.cwd, path).display());
    }
    println!();

    Ok(())
}

fn cancelled() -> Result<()> {
    output::cancel("Operation cancelled");
    Ok(())
}

/// Worktree suffix and branch name, from the argument or interactively.
///
/// Cancelling the combined prompt asks for the two names separately.
fn resolve_names(
    session: &Session<'_>,
    repo: &Repo,
    name: Option<&str>,
) -> Result<Option<(String, String)>> {
    if let Some(name) = name {
        return Ok(Some((name.to_string(), name.to_string())));
    }

    output::note(&format!("{}/{}-<name>", repo.parent.display(), repo.name));
    output::note("Press ESC to set worktree and branch names separately");
    if let Some(name) = session
        .prompter
        .text("Worktree & branch name:", "feature-name", None)?
    {
        return Ok(Some((name.clone(), name)));
    }

    let Some(suffix) = session
        .prompter
        .text("Worktree name:", "feature-name", None)?
    else {
        return Ok(None);
    };
    let Some(branch) = session
        .prompter
        .text("Branch name:", &suffix, Some(&suffix))?
    else {
        return Ok(None);
    };

    Ok(Some((suffix, branch)))
}

/// Asks how to handle a precondition. The first option proceeds, the last
/// cancels when there are three; `--yes` always proceeds.
fn resolve(
    session: &Session<'_>,
    opts: CreateOptions,
    message: &str,
    options: &[String],
) -> Result<Resolution> {
    if opts.yes {
        return Ok(Resolution::Proceed);
    }

    let resolution = match session.prompter.select(message, options, 0)? {
        None => Resolution::Cancel,
        Some(0) => Resolution::Proceed,
        Some(index) if index == options.len() - 1 && options.len() > 2 => Resolution::Cancel,
        Some(_) => Resolution::Ignore,
    };
    Ok(resolution)
}

fn prune(session: &Session<'_>, repo: &Repo) {
    if let Err(e) = session.git().worktree_prune(&repo.root) {
        log::debug!("git worktree prune failed: {}", e);
    }
    output::step("Prune", "git worktree prune", "removes stale refs");
}

/// Installs dependencies when a package manager is known and installs are
/// enabled, remembering the package manager on success.
fn install_step(session: &Session<'_>, path: &Path, settings: &Config, label: Option<&str>) {
    if !settings.install_deps {
        return;
    }
    let Some(pm) = install::detect_package_manager(path).or(settings.last_pm) else {
        return;
    };

    let command = install::install_command(pm);
    let detail = match label {
        Some(label) => format!("{command} ({label})"),
        None => command,
    };

    match install::install_dependencies(session.runner, pm, path) {
        Ok(()) => {
            output::step("Install", &detail, "installs dependencies");
            if let Err(e) = session.config.set("lastPm", pm.as_str()) {
                log::warn!("Could not remember package manager: {}", e);
            }
        }
        Err(e) => output::step_failed("Install", &detail, &e.to_string()),
    }
}

fn open_editor_step(session: &Session<'_>, path: &Path, worktree_name: &str, editor: Editor) {
    let Some(command) = EditorCommand::resolve(editor, session.env_editor.as_deref()) else {
        return;
    };

    let detail = command.display(&format!(".../{worktree_name}"));
    match command.open(session.runner, path) {
        Ok(()) => output::step("Open", &detail, "opens in editor"),
        Err(e) => output::step_failed("Open", &detail, &e.to_string()),
    }
}
