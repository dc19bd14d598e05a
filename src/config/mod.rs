//! Global user settings for gwt.
//!
//! Settings live in a single JSON document under the per-user config
//! directory (`~/.config/gwtree/config.json` on Linux). The file is plain JSON
//! and may be edited by hand; missing fields take their defaults.
//!
//! ```json
//! {
//!   "editor": "code",
//!   "installDeps": true,
//!   "lastPm": null
//! }
//! ```
//!
//! | key           | values                                 | default |
//! |---------------|----------------------------------------|---------|
//! | `editor`      | `code`, `cursor`, `default`, `none`    | `code`  |
//! | `installDeps` | `true`, `false`                        | `true`  |
//! | `lastPm`      | `pnpm`, `npm`, `yarn`, `bun`, `null`   | `null`  |
//!
//! `editor = "default"` resolves to `$EDITOR` at the time the editor is
//! launched.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::GwtError;
use crate::traits::ConfigStore;

/// Editor launched after a worktree is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Editor {
    #[default]
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "cursor")]
    Cursor,
    /// Whatever `$EDITOR` names at launch time.
    #[serde(rename = "default")]
    FromEnv,
    #[serde(rename = "none")]
    Disabled,
}

impl Editor {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Editor::Code => "code",
            Editor::Cursor => "cursor",
            Editor::FromEnv => "default",
            Editor::Disabled => "none",
        }
    }
}

impl fmt::Display for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Editor {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "code" => Ok(Editor::Code),
            "cursor" => Ok(Editor::Cursor),
            "default" => Ok(Editor::FromEnv),
            "none" => Ok(Editor::Disabled),
            _ => Err(()),
        }
    }
}

/// JavaScript package managers gwt knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Pnpm,
    Npm,
    Yarn,
    Bun,
}

impl PackageManager {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PackageManager::Pnpm => "pnpm",
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageManager {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pnpm" => Ok(PackageManager::Pnpm),
            "npm" => Ok(PackageManager::Npm),
            "yarn" => Ok(PackageManager::Yarn),
            "bun" => Ok(PackageManager::Bun),
            _ => Err(()),
        }
    }
}

/// The full set of user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub editor: Editor,
    pub install_deps: bool,
    pub last_pm: Option<PackageManager>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: Editor::Code,
            install_deps: true,
            last_pm: None,
        }
    }
}

impl Config {
    /// Sets one field from its string form, validating against the field's domain.
    ///
    /// # Errors
    /// Returns [`GwtError::InvalidConfigValue`] if the key is unknown or the
    /// value is not allowed for it. `self` is unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> std::result::Result<(), GwtError> {
        let invalid = || GwtError::InvalidConfigValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "editor" => self.editor = value.parse().map_err(|()| invalid())?,
            "installDeps" => self.install_deps = value.parse().map_err(|_| invalid())?,
            "lastPm" => {
                self.last_pm = if value == "null" {
                    None
                } else {
                    Some(value.parse().map_err(|()| invalid())?)
                };
            }
            _ => return Err(invalid()),
        }

        Ok(())
    }
}

/// Settings persisted as JSON on disk.
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// Creates a store backed by the per-user config directory.
    ///
    /// `GWTREE_CONFIG_DIR` overrides the directory.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined.
    pub fn new() -> Result<Self> {
        let dir = if let Ok(custom_dir) = std::env::var("GWTREE_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .context("Failed to get user config directory")?
                .join("gwtree")
        };

        Ok(Self::at(dir.join("config.json")))
    }

    /// Creates a store backed by an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings from disk, falling back to the defaults when the file
    /// cannot be read at all.
    fn load(&self) -> Config {
        match self.read() {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Invalid settings in {} ({}), using defaults",
                    self.path.display(),
                    e
                );
                Config::default()
            }
        }
    }

    /// Reads the file field by field. A field with an invalid value falls
    /// back to its default; the others are kept.
    ///
    /// Fails only when the file exists but is not a JSON object.
    fn read(&self) -> std::result::Result<Config, GwtError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        let fields: Map<String, Value> = serde_json::from_str(&content)?;
        let mut config = Config::default();
        if let Some(editor) = self.field(&fields, "editor") {
            config.editor = editor;
        }
        if let Some(install_deps) = self.field(&fields, "installDeps") {
            config.install_deps = install_deps;
        }
        if let Some(last_pm) = self.field(&fields, "lastPm") {
            config.last_pm = last_pm;
        }
        Ok(config)
    }

    fn field<T: DeserializeOwned>(&self, fields: &Map<String, Value>, key: &str) -> Option<T> {
        let value = fields.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!(
                    "Ignoring invalid {} in {} ({})",
                    key,
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    fn save(&self, config: &Config) -> std::result::Result<(), GwtError> {
        write_json_atomically(&self.path, config)
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self) -> Config {
        self.load()
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), GwtError> {
        // An unreadable file is left for the user to fix or `reset`.
        let mut config = self.read()?;
        config.apply(key, value)?;
        self.save(&config)
    }

    fn reset(&self) -> std::result::Result<(), GwtError> {
        self.save(&Config::default())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }
}

/// Serializes `value` as pretty JSON, writing to a temp file then renaming.
pub(crate) fn write_json_atomically<T: Serialize>(
    path: &Path,
    value: &T,
) -> std::result::Result<(), GwtError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// In-memory settings for tests.
#[derive(Default)]
pub struct MemoryConfigStore {
    config: RefCell<Config>,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config: RefCell::new(config),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self) -> Config {
        self.config.borrow().clone()
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), GwtError> {
        let mut config = self.get();
        config.apply(key, value)?;
        *self.config.borrow_mut() = config;
        Ok(())
    }

    fn reset(&self) -> std::result::Result<(), GwtError> {
        *self.config.borrow_mut() = Config::default();
        Ok(())
    }

    fn path(&self) -> PathBuf {
        PathBuf::from("<memory>/config.json")
    }
}
