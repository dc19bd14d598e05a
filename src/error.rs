use std::path::PathBuf;

/// Errors surfaced by gwt operations.
///
/// Precondition failures (`NotAGitRepository`, `DirectoryAlreadyExists`,
/// `WorktreeNotFound`, `UncommittedChanges`) and the destructive git failures
/// end the process with exit code 1.
/// The editor, install and pull variants are reported as failed steps and the
/// handler carries on.
#[derive(Debug, thiserror::Error)]
pub enum GwtError {
    #[error("Not in a git repository")]
    NotAGitRepository,

    #[error("Directory already exists: {}", .0.display())]
    DirectoryAlreadyExists(PathBuf),

    #[error("Worktree not found: {0}")]
    WorktreeNotFound(String),

    #[error("Worktree has uncommitted changes. Commit or stash them first.")]
    UncommittedChanges,

    #[error("{command}: {message}")]
    GitCommandFailed { command: String, message: String },

    #[error("Invalid value '{value}' for config key '{key}'")]
    InvalidConfigValue { key: String, value: String },

    #[error("Failed to open editor: {0}")]
    EditorLaunchFailed(String),

    #[error("Failed to install dependencies: {0}")]
    InstallCommandFailed(String),

    #[error("Failed to pull: {0}")]
    PullFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt failed: {0}")]
    Prompt(String),
}

impl GwtError {
    /// The line shown to the user for this error.
    ///
    /// Git prints its actual complaint on the last line of stderr, after hints.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            GwtError::GitCommandFailed { message, .. } => last_line(message)
                .map_or_else(|| self.to_string(), ToString::to_string),
            _ => self.to_string(),
        }
    }
}

/// Last non-empty line of a multi-line message.
#[must_use]
pub fn last_line(message: &str) -> Option<&str> {
    message.lines().map(str::trim).rfind(|line| !line.is_empty())
}

/// Failure of a single external command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{command}: {message}")]
pub struct CommandError {
    pub command: String,
    pub message: String,
}

impl CommandError {
    pub fn new(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Short description suitable for a failed step line.
    #[must_use]
    pub fn summary(&self) -> &str {
        last_line(&self.message).unwrap_or("failed")
    }
}

impl From<CommandError> for GwtError {
    fn from(err: CommandError) -> Self {
        GwtError::GitCommandFailed {
            command: err.command,
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_uses_last_stderr_line() {
        let err = GwtError::GitCommandFailed {
            command: "git worktree add".to_string(),
            message: "hint: something\nfatal: 'feature' is already checked out\n".to_string(),
        };
        assert_eq!(err.summary(), "fatal: 'feature' is already checked out");
    }

    #[test]
    fn test_summary_falls_back_to_display() {
        let err = GwtError::GitCommandFailed {
            command: "git merge x".to_string(),
            message: "  \n".to_string(),
        };
        assert_eq!(err.summary(), "git merge x:   \n");
        assert_eq!(
            GwtError::UncommittedChanges.summary(),
            "Worktree has uncommitted changes. Commit or stash them first."
        );
    }

    #[test]
    fn test_command_error_summary() {
        let err = CommandError::new("pnpm install", "");
        assert_eq!(err.summary(), "failed");

        let err = CommandError::new("git pull", "error: cannot pull\nfatal: no remote");
        assert_eq!(err.summary(), "fatal: no remote");
    }

    #[test]
    fn test_directory_error_names_the_path() {
        let err = GwtError::DirectoryAlreadyExists(PathBuf::from("/tmp/demo-x"));
        assert_eq!(err.to_string(), "Directory already exists: /tmp/demo-x");
    }
}
