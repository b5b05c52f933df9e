//! Structured reporting for documentation runs.

use std::path::PathBuf;

use pbi_doc_core::Category;
use serde::{Deserialize, Serialize};

/// Structured failure code for aborted runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    /// A required input file or directory does not exist.
    NotFound,
    /// A rename or read was refused by the environment.
    PermissionDenied,
    /// The package is not a readable zip container.
    CorruptContainer,
    /// The package lacks the layout or model entry.
    MissingEntry,
    /// An unrelated file already occupies the package's archive name.
    ArchiveConflict,
    /// The package could not be renamed back to its original name.
    RevertFailed,
    /// The output document could not be produced.
    RenderFailed,
    /// Any other file system failure.
    IoError,
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::PermissionDenied => write!(f, "permission_denied"),
            Self::CorruptContainer => write!(f, "corrupt_container"),
            Self::MissingEntry => write!(f, "missing_entry"),
            Self::ArchiveConflict => write!(f, "archive_conflict"),
            Self::RevertFailed => write!(f, "revert_failed"),
            Self::RenderFailed => write!(f, "render_failed"),
            Self::IoError => write!(f, "io_error"),
        }
    }
}

/// Outcome of one category in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionReport {
    pub category: Category,
    /// Number of records extracted.
    pub records: usize,
    /// Whether the template had an anchor for this category.
    pub inserted: bool,
}

/// Summary of a successful documentation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub report_name: String,
    /// Package the metadata was read from.
    pub package: PathBuf,
    /// Document that was written.
    pub output: PathBuf,
    /// Date stamped into the document, `YYYY-MM-DD`.
    pub generated_on: String,
    pub sections: Vec<SectionReport>,
}

impl RunReport {
    /// Categories whose block did not make it into the document.
    pub fn omitted(&self) -> Vec<Category> {
        self.sections
            .iter()
            .filter(|s| !s.inserted)
            .map(|s| s.category)
            .collect()
    }
}
