use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{CommandError, GwtError};
use crate::storage::WorktreeRecord;

/// Runs external programs (git, package managers, editors) to completion.
///
/// Abstracted so handlers can be exercised against a scripted runner in tests.
pub trait CommandRunner {
    /// Runs `program` with captured output and returns trimmed stdout.
    ///
    /// # Errors
    /// Returns a [`CommandError`] carrying stderr if the process cannot be
    /// spawned or exits with a non-zero status.
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>)
    -> Result<String, CommandError>;

    /// Runs `program` attached to the current terminal.
    ///
    /// # Errors
    /// Returns a [`CommandError`] if the process cannot be spawned or exits
    /// with a non-zero status.
    fn run_attached(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<(), CommandError>;
}

/// Global user settings.
pub trait ConfigStore {
    /// Current settings merged with defaults.
    fn get(&self) -> Config;

    /// Persists a single setting after validating it.
    ///
    /// # Errors
    /// Returns [`GwtError::InvalidConfigValue`] for unknown keys or values
    /// outside the key's domain, or an IO error if the write fails.
    fn set(&self, key: &str, value: &str) -> Result<(), GwtError>;

    /// Restores every setting to its default.
    ///
    /// # Errors
    /// Returns an error if the settings cannot be written.
    fn reset(&self) -> Result<(), GwtError>;

    /// Location of the backing file.
    fn path(&self) -> PathBuf;
}

/// Cross-repository list of worktrees created by gwt.
pub trait RecordStore {
    /// All records, in insertion order.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    fn list(&self) -> Result<Vec<WorktreeRecord>, GwtError>;

    /// Appends a record. Callers check for an existing path themselves.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    fn add(&self, record: WorktreeRecord) -> Result<(), GwtError>;

    /// Removes the first record with exactly this path.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    fn remove(&self, path: &Path) -> Result<Option<WorktreeRecord>, GwtError>;

    /// Looks up a record by exact path.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    fn get(&self, path: &Path) -> Result<Option<WorktreeRecord>, GwtError> {
        Ok(self.list()?.into_iter().find(|record| record.path == path))
    }
}
