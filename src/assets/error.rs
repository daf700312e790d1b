//! Asset lookup errors.
//!
//! Absence is not an error: lookups report it as `Ok(None)`.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A filesystem failure other than "does not exist".
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("access denied to {}", path.display())]
    AccessDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AssetError {
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::AccessDenied { path, source },
            _ => Self::Io { path, source },
        }
    }

    /// The on-disk path the failing operation touched.
    pub fn path(&self) -> &Path {
        match self {
            Self::AccessDenied { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

/// True for errors that mean "nothing here": a missing entry, or a
/// regular file used as an intermediate directory.
pub(crate) fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
