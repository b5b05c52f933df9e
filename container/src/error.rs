//! Error types for package and payload operations.
//!
//! Provides one error type covering every way opening a report package can
//! fail: missing files, refused or conflicting renames, unreadable archives,
//! absent entries and configuration problems. Payload decoding and JSON
//! syntax problems are deliberately absent; the loader degrades those to an
//! empty payload.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while accessing a report package.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// A required file or directory does not exist.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The environment refused a rename or read.
    #[error("permission denied: {}: {source}", path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a readable zip container.
    #[error("corrupt archive {}: {reason}", path.display())]
    CorruptArchive { path: PathBuf, reason: String },

    /// Both the package and a file under its archive name exist.
    #[error(
        "{} already exists next to {}; move one of them away",
        archive.display(),
        original.display()
    )]
    ArchiveConflict { archive: PathBuf, original: PathBuf },

    /// A requested entry is absent from the archive.
    #[error("entry not found in archive: {entry}")]
    MissingEntry { entry: String },

    /// Invalid caller input (e.g. wrong file extension).
    #[error("{0}")]
    InvalidInput(String),

    /// Other file I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Zip read or write failure after the archive was opened.
    #[error("zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl ContainerError {
    /// Classifies an I/O error raised while touching `path`.
    pub(crate) fn from_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ContainerError::NotFound { path: path.into() },
            std::io::ErrorKind::PermissionDenied => ContainerError::PermissionDenied {
                path: path.into(),
                source: err,
            },
            _ => ContainerError::IoError(err),
        }
    }
}

/// Convenience alias for results with [`ContainerError`].
pub type Result<T> = std::result::Result<T, ContainerError>;
