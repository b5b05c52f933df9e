//! Report package access for Power BI documentation.
//!
//! This crate covers everything between a report package on disk and the
//! parsed JSON payloads the extractors consume:
//!
//! - [`PackagedReport`] / [`ArchiveView`]: viewing a `.pbit`/`.pbix` package
//!   as a zip archive and restoring its original name afterwards.
//! - [`load_json`] / [`load_payload`]: decoding UTF-16LE (or UTF-8) payloads
//!   into [`serde_json::Value`].
//! - [`convert_pbix_to_pbit`]: writing a data-free template from a report.
//! - [`DocConfig`]: YAML configuration for documentation runs.
//!
//! # Quick start
//!
//! ```no_run
//! use pbi_doc_container::{LAYOUT_ENTRY, MODEL_ENTRY, PackagedReport, load_payload};
//!
//! let view = PackagedReport::new("Sales.pbit").open().unwrap();
//! let paths = view.extract_entries("work", &[LAYOUT_ENTRY, MODEL_ENTRY]).unwrap();
//! view.close().unwrap();
//!
//! let layout = load_payload(&paths[0]).unwrap();
//! let model = load_payload(&paths[1]).unwrap();
//! # let _ = (layout, model);
//! ```

mod archive;
mod config;
mod convert;
mod error;
mod loader;

pub use archive::{
    ARCHIVE_EXTENSION, ArchiveView, LAYOUT_ENTRY, MODEL_ENTRY, PackagedReport, archive_path_for,
    ensure_archive_form, extract_entries, revert_to_original,
};
pub use config::{DEFAULT_LOG_FILE, DEFAULT_LOG_LEVEL, DocConfig, LoggingConfig};
pub use convert::{DATA_PREFIX, convert_pbix_to_pbit};
pub use error::{ContainerError, Result};
pub use loader::{DecodeError, TextEncoding, load_json, load_payload};
