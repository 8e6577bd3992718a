//! OS directory resolution for config, data and log files.

use std::io;
use std::path::{Path, PathBuf};

/// Errors raised while resolving or creating platform directories.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,

    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Per-user directories for the orrery driver.
///
/// Follows OS conventions (XDG on Linux, Known Folders on Windows, Library on
/// macOS).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformDirs {
    /// `config.ron` lives here.
    pub config_dir: PathBuf,
    /// Default location for snapshots and catalogs.
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

const APP_NAME: &str = "orrery";

impl PlatformDirs {
    /// Resolve directories without creating them on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if the OS does not expose a
    /// configuration directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let config_base = dirs::config_dir().ok_or(PlatformError::NoConfigDir)?;
        let app_config = config_base.join(APP_NAME);

        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| app_config.clone())
            .join(APP_NAME);

        Ok(Self {
            config_dir: app_config.join("config"),
            data_dir,
            log_dir: app_config.join("logs"),
        })
    }

    /// Resolve directories under a custom base path.
    ///
    /// Used when `--config` points somewhere else, and in tests.
    pub fn resolve_with_root(root: &Path) -> Self {
        Self {
            config_dir: root.to_path_buf(),
            data_dir: root.join("data"),
            log_dir: root.join("logs"),
        }
    }

    /// Create every directory on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Io`] if any directory cannot be created.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}
