use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::write_json_atomically;
use crate::error::GwtError;
use crate::traits::RecordStore;

/// A worktree created by gwt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorktreeRecord {
    /// Absolute path of the worktree directory; unique within the store.
    pub path: PathBuf,
    pub branch: String,
    /// Top-level directory of the repository the worktree was created from.
    pub repo_root: PathBuf,
    pub repo_name: String,
    /// RFC 3339 timestamp. Kept as written so a hand-edited value never
    /// makes the store unreadable.
    #[serde(default)]
    pub created_at: String,
}

impl WorktreeRecord {
    pub fn new(
        path: impl Into<PathBuf>,
        branch: impl Into<String>,
        repo_root: impl Into<PathBuf>,
        repo_name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            branch: branch.into(),
            repo_root: repo_root.into(),
            repo_name: repo_name.into(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Directory name of the worktree, e.g. `demo-feature-x`.
    #[must_use]
    pub fn dir_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Records of `repo_name` whose directory still exists.
///
/// Stale records are only hidden here, never deleted from the store.
#[must_use]
pub fn existing_for_repo(records: Vec<WorktreeRecord>, repo_name: &str) -> Vec<WorktreeRecord> {
    records
        .into_iter()
        .filter(|record| record.repo_name == repo_name && record.path.exists())
        .collect()
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    worktrees: Vec<WorktreeRecord>,
}

/// Records persisted as `{"worktrees": [...]}` in a JSON file.
///
/// Every call is a full read-modify-write. Two gwt processes writing at the
/// same time race and the last write wins.
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    /// Creates a store in `~/.gwtree/worktrees.json`.
    ///
    /// `GWTREE_DATA_DIR` overrides the directory.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let dir = if let Ok(custom_dir) = std::env::var("GWTREE_DATA_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::home_dir()
                .context("Failed to get user home directory")?
                .join(".gwtree")
        };

        Ok(Self::at(dir.join("worktrees.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> std::result::Result<StoreData, GwtError> {
        if !self.path.exists() {
            return Ok(StoreData::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(StoreData::default());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, data: &StoreData) -> std::result::Result<(), GwtError> {
        write_json_atomically(&self.path, data)
    }
}

impl RecordStore for JsonRecordStore {
    fn list(&self) -> std::result::Result<Vec<WorktreeRecord>, GwtError> {
        Ok(self.load()?.worktrees)
    }

    fn add(&self, record: WorktreeRecord) -> std::result::Result<(), GwtError> {
        let mut data = self.load()?;
        data.worktrees.push(record);
        self.save(&data)
    }

    fn remove(&self, path: &Path) -> std::result::Result<Option<WorktreeRecord>, GwtError> {
        let mut data = self.load()?;
        let Some(index) = data.worktrees.iter().position(|record| record.path == path) else {
            return Ok(None);
        };

        let removed = data.worktrees.remove(index);
        self.save(&data)?;
        Ok(Some(removed))
    }
}

/// In-memory records for tests.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RefCell<Vec<WorktreeRecord>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new(records: Vec<WorktreeRecord>) -> Self {
        Self {
            records: RefCell::new(records),
        }
    }
}

impl RecordStore for MemoryRecordStore {
    fn list(&self) -> std::result::Result<Vec<WorktreeRecord>, GwtError> {
        Ok(self.records.borrow().clone())
    }

    fn add(&self, record: WorktreeRecord) -> std::result::Result<(), GwtError> {
        self.records.borrow_mut().push(record);
        Ok(())
    }

    fn remove(&self, path: &Path) -> std::result::Result<Option<WorktreeRecord>, GwtError> {
        let mut records = self.records.borrow_mut();
        let index = records.iter().position(|record| record.path == path);
        Ok(index.map(|index| records.remove(index)))
    }
}
