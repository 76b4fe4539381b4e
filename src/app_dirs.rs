//! Application directory helpers anchored to a single `.tracknet` folder.
//!
//! Config and log files live under the OS config directory by default; set
//! `TRACKNET_CONFIG_HOME` to relocate them for tests or portable setups.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application directory that lives under the config root.
pub const APP_DIR_NAME: &str = ".tracknet";
/// Environment variable that replaces the OS config root.
pub const CONFIG_HOME_ENV: &str = "TRACKNET_CONFIG_HOME";

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No suitable base config directory available for application files")]
    NoBaseDir,
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Return the root `.tracknet` directory, creating it if needed.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = config_base_dir().ok_or(AppDirError::NoBaseDir)?;
    ensure_dir(base.join(APP_DIR_NAME))
}

/// Return `<root>/logs`, creating it if needed.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    ensure_dir(app_root_dir()?.join("logs"))
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    std::fs::create_dir_all(&path).map_err(|source| AppDirError::CreateDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn config_base_dir() -> Option<PathBuf> {
    let from_env = std::env::var(CONFIG_HOME_ENV).ok();
    let os_default = BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf());
    pick_base_dir(from_env.as_deref(), os_default.as_deref())
}

/// A non-blank override wins over the OS config directory.
fn pick_base_dir(from_env: Option<&str>, os_default: Option<&Path>) -> Option<PathBuf> {
    match from_env.map(str::trim) {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => os_default.map(Path::to_path_buf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn override_beats_os_default() {
        let os = Path::new("/os/config");
        assert_eq!(
            pick_base_dir(Some("/portable"), Some(os)),
            Some(PathBuf::from("/portable"))
        );
        assert_eq!(pick_base_dir(Some("   "), Some(os)), Some(os.to_path_buf()));
        assert_eq!(pick_base_dir(None, Some(os)), Some(os.to_path_buf()));
        assert_eq!(pick_base_dir(None, None), None);
    }

    #[test]
    fn ensure_dir_creates_nested_folders() {
        let base = tempdir().unwrap();
        let target = base.path().join(APP_DIR_NAME).join("logs");
        let created = ensure_dir(target.clone()).unwrap();
        assert_eq!(created, target);
        assert!(target.is_dir());
    }
}
