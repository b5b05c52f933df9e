//! Power BI report documentation pipeline.
//!
//! This crate wires the other `pbi-doc` crates into one run: it opens a
//! `.pbit` package, loads its layout and data model payloads, formats the
//! six documentation blocks and renders them into a Word template.
//!
//! # Main entry points
//!
//! - [`generate`]: the whole run, reduced to the output path or `None`.
//! - [`Pipeline::run`]: the same run with a [`RunReport`] on success and a
//!   [`PipelineError`] (carrying a [`FailureCode`]) on failure.
//! - [`Pipeline::load`]: unpack and parse only, for inspecting a package
//!   without a template.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let output = pbi_doc_generator::generate(
//!     Path::new("reports/Sales.pbit"),
//!     Path::new("templates/modelo.docx"),
//!     Path::new("docs"),
//! );
//! match output {
//!     Some(path) => println!("documentation written to {}", path.display()),
//!     None => eprintln!("documentation failed; see the log"),
//! }
//! ```

mod error;
pub mod output;
pub mod pipeline;
pub mod report;

pub use error::{PipelineError, Result};
pub use pipeline::{
    LoadedReport, OUTPUT_SUFFIX, Pipeline, PipelineState, WORKDIR_PREFIX, extract_parallel,
    generate,
};
pub use report::{FailureCode, RunReport, SectionReport};
