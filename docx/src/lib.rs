//! Word template rendering for Power BI documentation.
//!
//! Takes the labelled text blocks produced by `pbi-doc-core` and writes them
//! into a copy of a `.docx` template:
//!
//! - paragraphs containing `Data da documentação:` or `Nome do Relatório:`
//!   get the date or report name appended;
//! - each block is inserted as a new paragraph right after the first
//!   paragraph whose text is exactly the block's label (`Páginas`,
//!   `Tabelas`, ...);
//! - the output never overwrites an existing file. A taken name gets a
//!   `_versão_NN` suffix instead.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use pbi_doc_core::{LayoutDocument, ModelDocument, extract_all};
//!
//! let results = extract_all(&LayoutDocument::default(), &ModelDocument::default());
//! let path = pbi_doc_docx::render(
//!     "Sales",
//!     &results,
//!     Path::new("modelo.docx"),
//!     Path::new("Sales_documentado.docx"),
//! )
//! .unwrap();
//! println!("{}", path.display());
//! ```

mod body;
mod error;
mod renderer;
mod versioning;

pub use body::{BodyFill, DATE_LABEL, REPORT_NAME_LABEL, body_paragraphs, fill_body};
pub use error::{RenderError, Result};
pub use renderer::{
    DATE_FORMAT, DOCUMENT_PART, DocumentRenderer, RenderOutcome, read_part, render,
};
pub use versioning::{FIRST_VERSION, VERSION_MARKER, resolve_output_path, versioned_path};
