use std::io;
use std::path::PathBuf;

use orrery_config::ConfigError;
use orrery_orbit::CatalogError;
use orrery_system::SystemError;

use crate::platform::PlatformError;

/// Top-level failure of the orrery driver.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    System(#[from] SystemError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Snapshot(#[from] ron::Error),

    #[error("failed to parse snapshot: {0}")]
    SnapshotParse(#[from] ron::error::SpannedError),
}

impl AppError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
