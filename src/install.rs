use std::path::Path;

use crate::config::PackageManager;
use crate::error::GwtError;
use crate::traits::CommandRunner;

/// Lockfiles in priority order.
const LOCKFILES: [(&str, PackageManager); 4] = [
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("bun.lockb", PackageManager::Bun),
    ("yarn.lock", PackageManager::Yarn),
    ("package-lock.json", PackageManager::Npm),
];

/// Detects the package manager a checkout uses from its lockfile.
///
/// A `package.json` without any known lockfile defaults to pnpm.
#[must_use]
pub fn detect_package_manager(dir: &Path) -> Option<PackageManager> {
    LOCKFILES
        .iter()
        .find(|(lockfile, _)| dir.join(lockfile).exists())
        .map(|(_, pm)| *pm)
        .or_else(|| {
            dir.join("package.json")
                .exists()
                .then_some(PackageManager::Pnpm)
        })
}

/// The install command line, e.g. `pnpm install`.
#[must_use]
pub fn install_command(pm: PackageManager) -> String {
    format!("{} install", pm.as_str())
}

/// Installs dependencies in `dir`.
///
/// # Errors
/// Returns [`GwtError::InstallCommandFailed`] if the package manager is
/// missing or the install fails.
pub fn install_dependencies(
    runner: &dyn CommandRunner,
    pm: PackageManager,
    dir: &Path,
) -> Result<(), GwtError> {
    runner
        .run(pm.as_str(), &["install"], Some(dir))
        .map(drop)
        .map_err(|e| GwtError::InstallCommandFailed(e.summary().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::ScriptedRunner;
    use std::fs;

    #[test]
    fn test_detect_nothing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(detect_package_manager(dir.path()), None);
        assert_eq!(detect_package_manager(&dir.path().join("missing")), None);
        Ok(())
    }

    #[test]
    fn test_detect_by_lockfile() -> anyhow::Result<()> {
        for (lockfile, expected) in LOCKFILES {
            let dir = tempfile::tempdir()?;
            fs::write(dir.path().join("package.json"), "{}")?;
            fs::write(dir.path().join(lockfile), "")?;
            assert_eq!(detect_package_manager(dir.path()), Some(expected));
        }
        Ok(())
    }

    #[test]
    fn test_detect_priority() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("package-lock.json"), "")?;
        fs::write(dir.path().join("yarn.lock"), "")?;
        assert_eq!(detect_package_manager(dir.path()), Some(PackageManager::Yarn));

        fs::write(dir.path().join("pnpm-lock.yaml"), "")?;
        assert_eq!(detect_package_manager(dir.path()), Some(PackageManager::Pnpm));
        Ok(())
    }

    #[test]
    fn test_package_json_defaults_to_pnpm() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("package.json"), "{}")?;
        assert_eq!(detect_package_manager(dir.path()), Some(PackageManager::Pnpm));
        Ok(())
    }

    #[test]
    fn test_install_runs_in_worktree() -> anyhow::Result<()> {
        let runner = ScriptedRunner::new();
        install_dependencies(&runner, PackageManager::Bun, Path::new("/src/demo-x"))?;
        assert_eq!(runner.calls(), vec!["bun install"]);
        assert_eq!(install_command(PackageManager::Yarn), "yarn install");
        Ok(())
    }

    #[test]
    fn test_install_failure() {
        let runner = ScriptedRunner::new().fail("npm install", "npm ERR! missing script");
        let result = install_dependencies(&runner, PackageManager::Npm, Path::new("/x"));
        assert!(matches!(result, Err(GwtError::InstallCommandFailed(msg)) if msg == "npm ERR! missing script"));
    }
}
