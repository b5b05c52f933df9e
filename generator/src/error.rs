//! Error type for documentation runs.

use std::path::PathBuf;

use pbi_doc_container::ContainerError;
use pbi_doc_docx::RenderError;
use thiserror::Error;

use crate::report::FailureCode;

/// Why a documentation run was aborted.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An input path checked before any work starts is missing.
    #[error("{what} not found: {}", path.display())]
    MissingInput { what: &'static str, path: PathBuf },

    /// The private working directory could not be created.
    #[error("cannot create working directory in {}: {source}", path.display())]
    Workdir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Opening, unpacking or reading the package failed.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// The package could not be renamed back after unpacking.
    #[error("failed to restore {}: {source}", path.display())]
    RevertFailed {
        path: PathBuf,
        #[source]
        source: ContainerError,
    },

    /// Producing the output document failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PipelineError {
    /// The structured failure code of this error.
    pub fn code(&self) -> FailureCode {
        match self {
            Self::MissingInput { .. } => FailureCode::NotFound,
            Self::Workdir { source, .. } => io_code(source),
            Self::Container(err) => container_code(err),
            Self::RevertFailed { .. } => FailureCode::RevertFailed,
            Self::Render(_) => FailureCode::RenderFailed,
        }
    }
}

fn container_code(err: &ContainerError) -> FailureCode {
    match err {
        ContainerError::NotFound { .. } => FailureCode::NotFound,
        ContainerError::PermissionDenied { .. } => FailureCode::PermissionDenied,
        ContainerError::CorruptArchive { .. } | ContainerError::ZipError(_) => {
            FailureCode::CorruptContainer
        }
        ContainerError::MissingEntry { .. } => FailureCode::MissingEntry,
        ContainerError::ArchiveConflict { .. } => FailureCode::ArchiveConflict,
        ContainerError::IoError(source) => io_code(source),
        ContainerError::InvalidInput(_) | ContainerError::YamlError(_) => FailureCode::IoError,
    }
}

fn io_code(err: &std::io::Error) -> FailureCode {
    match err.kind() {
        std::io::ErrorKind::NotFound => FailureCode::NotFound,
        std::io::ErrorKind::PermissionDenied => FailureCode::PermissionDenied,
        _ => FailureCode::IoError,
    }
}

/// Convenience alias for results with [`PipelineError`].
pub type Result<T> = std::result::Result<T, PipelineError>;
