//! Typed report records and documentation field extractors.
//!
//! This crate holds the pure half of the documentation pipeline:
//!
//! - [`LayoutDocument`] and [`ModelDocument`]: strongly typed views over the
//!   layout (`Report/Layout`) and data model (`DataModelSchema`) payloads of
//!   a report package, with documented defaults for every optional field.
//! - Six extractors ([`extract_pages`], [`extract_visuals`],
//!   [`extract_tables`], [`extract_measures`], [`extract_sources`],
//!   [`extract_relationships`]) that format one information category each.
//! - [`Category`] and [`ExtractionResult`]: the labelled blocks handed to the
//!   document renderer.
//!
//! # Example
//!
//! ```
//! use pbi_doc_core::*;
//! use serde_json::json;
//!
//! let model = ModelDocument::from_value(&json!({
//!     "model": {
//!         "tables": [
//!             {"name": "LocalDateTable_1", "columns": [{"name": "Date"}]},
//!             {"name": "Sales", "columns": [{"name": "Amount", "dataType": "double"}]}
//!         ]
//!     }
//! }))
//! .unwrap();
//!
//! let results = extract_all(&LayoutDocument::default(), &model);
//! let tables = results.iter().find(|r| r.category == Category::Tables).unwrap();
//! assert_eq!(tables.records, 1);
//! assert!(tables.text.contains("Tabela: Sales"));
//! assert!(!tables.text.contains("LocalDateTable"));
//! ```

mod category;
mod extract;
mod types;

pub use category::{Category, ExtractionResult, RECORD_SEPARATOR};
pub use extract::{
    NO_QUERY_REFS, extract_all, extract_category, extract_measures, extract_pages,
    extract_relationships, extract_sources, extract_tables, extract_visuals,
};
pub use types::*;
