//! Error types for template rendering.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while rendering a documentation file.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template file does not exist.
    #[error("template not found: {}", path.display())]
    TemplateNotFound { path: PathBuf },

    /// The template is not a readable `.docx` package.
    #[error("invalid template {}: {reason}", path.display())]
    InvalidTemplate { path: PathBuf, reason: String },

    /// A required package part is absent from the template.
    #[error("template has no '{part}' part")]
    MissingPart { part: String },

    /// The document part is not well-formed XML.
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// The document part ends before its structure is complete.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Zip read or write failure.
    #[error("zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Other file I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The finished document could not be moved into place.
    #[error("failed to save {}: {source}", path.display())]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for results with [`RenderError`].
pub type Result<T> = std::result::Result<T, RenderError>;
