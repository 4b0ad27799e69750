use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the planning and apply engine.
///
/// Only `CollisionUnresolved` stops a planning pass.
/// The other variants are confined to the single file or action they name.
#[derive(Debug, Error)]
pub enum SortError {
    #[error("No year or season/episode tag found in '{}'", .0.display())]
    UnparseableName(PathBuf),

    #[error("No free name found for '{}' after {attempts} attempts", path.display())]
    CollisionUnresolved { path: PathBuf, attempts: usize },

    #[error("Destination '{}' is already occupied by another file (source '{}')", destination.display(), original.display())]
    DestinationOccupiedByOther { original: PathBuf, destination: PathBuf },

    #[error("Permission denied for '{}': {error}", path.display())]
    PermissionDenied { path: PathBuf, error: io::Error },

    #[error("Unexpected IO error for '{}': {error}", path.display())]
    UnexpectedIo { path: PathBuf, error: io::Error },
}

impl SortError {
    /// Wrap an IO error for the given path, keeping permission failures apart.
    #[must_use]
    pub fn from_io(path: PathBuf, error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path, error }
        } else {
            Self::UnexpectedIo { path, error }
        }
    }

    /// True when the whole planning pass must stop.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::CollisionUnresolved { .. })
    }
}
