//! Field extractors: one pure function per information category.
//!
//! Every extractor maps a typed payload to a text block. Records end with a
//! [`RECORD_SEPARATOR`] line so blocks stay readable once concatenated into
//! the output document. None of these functions perform I/O.
//!
//! # Examples
//!
//! ```
//! use pbi_doc_core::{LayoutDocument, extract_pages};
//! use serde_json::json;
//!
//! let layout = LayoutDocument::from_value(&json!({
//!     "sections": [{"displayName": "Overview"}, {}]
//! }))
//! .unwrap();
//!
//! assert_eq!(
//!     extract_pages(&layout),
//!     "\nOverview\n-----------\n\nSem Nome\n-----------\n"
//! );
//! ```

use std::collections::HashSet;

use crate::category::{Category, ExtractionResult, RECORD_SEPARATOR};
use crate::types::{ColumnKind, LayoutDocument, MISSING_VALUE, ModelDocument, Position};

/// Sentence used when a visual binds no fields.
pub const NO_QUERY_REFS: &str = "Não há medidas utilizadas no visual";

/// Runs all six extractors and returns their blocks in [`Category::ALL`]
/// order.
pub fn extract_all(layout: &LayoutDocument, model: &ModelDocument) -> Vec<ExtractionResult> {
    Category::ALL
        .into_iter()
        .map(|category| extract_category(category, layout, model))
        .collect()
}

/// Runs the extractor for a single category.
pub fn extract_category(
    category: Category,
    layout: &LayoutDocument,
    model: &ModelDocument,
) -> ExtractionResult {
    let records = match category {
        Category::Pages => page_records(layout),
        Category::Tables => table_records(model),
        Category::Measures => measure_records(model),
        Category::Visuals => visual_records(layout),
        Category::Sources => source_records(model),
        Category::Relationships => relationship_records(model),
    };
    ExtractionResult::from_records(category, records)
}

/// One record per page, in layout order.
pub fn extract_pages(layout: &LayoutDocument) -> String {
    extract_category(Category::Pages, layout, &ModelDocument::default()).text
}

/// One record per visual with its page, placement, type and bound fields.
pub fn extract_visuals(layout: &LayoutDocument) -> String {
    extract_category(Category::Visuals, layout, &ModelDocument::default()).text
}

/// One record per column of every non-reserved table.
pub fn extract_tables(model: &ModelDocument) -> String {
    extract_category(Category::Tables, &LayoutDocument::default(), model).text
}

/// One record per distinct (table, measure) pair.
///
/// Unlike the other model extractors this one does not skip reserved date
/// tables.
pub fn extract_measures(model: &ModelDocument) -> String {
    extract_category(Category::Measures, &LayoutDocument::default(), model).text
}

/// One record per partition of every non-reserved table.
pub fn extract_sources(model: &ModelDocument) -> String {
    extract_category(Category::Sources, &LayoutDocument::default(), model).text
}

/// One record per relationship whose endpoints are both non-reserved.
pub fn extract_relationships(model: &ModelDocument) -> String {
    extract_category(Category::Relationships, &LayoutDocument::default(), model).text
}

fn page_records(layout: &LayoutDocument) -> Vec<String> {
    layout
        .sections
        .iter()
        .map(|section| format!("{}\n{RECORD_SEPARATOR}\n", section.name()))
        .collect()
}

fn visual_records(layout: &LayoutDocument) -> Vec<String> {
    let mut records = Vec::new();
    for section in &layout.sections {
        let page = section.name();
        for container in &section.visual_containers {
            let config = container.parsed_config();
            let position = config.position();
            let query_refs = config.query_refs();
            let used = if query_refs.is_empty() {
                NO_QUERY_REFS.to_string()
            } else {
                query_refs.join(", ")
            };
            records.push(format!(
                "Página: {page}\n\
                 X: {}\n\
                 Y: {}\n\
                 Altura: {}\n\
                 Largura: {}\n\
                 Tipo de visual: {}\n\
                 Medidas utilizadas: {used}\n\
                 {RECORD_SEPARATOR}\n",
                Position::truncate(position.x),
                Position::truncate(position.y),
                Position::truncate(position.height),
                Position::truncate(position.width),
                config.visual_type().unwrap_or(MISSING_VALUE),
            ));
        }
    }
    records
}

fn table_records(model: &ModelDocument) -> Vec<String> {
    let mut records = Vec::new();
    for table in model.tables().iter().filter(|t| !t.is_reserved()) {
        for column in &table.columns {
            let calculated = match column.kind() {
                ColumnKind::Calculated => "Sim",
                ColumnKind::Authored => "Não",
            };
            records.push(format!(
                "Tabela: {}\n\
                 Coluna: {}\n\
                 Tipo de dados: {}\n\
                 Coluna calculada?: {calculated}\n\
                 {RECORD_SEPARATOR}\n",
                table.name, column.name, column.data_type,
            ));
        }
    }
    records
}

fn measure_records(model: &ModelDocument) -> Vec<String> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut records = Vec::new();
    for table in model.tables() {
        for measure in &table.measures {
            if !seen.insert((table.name.as_str(), measure.name.as_str())) {
                continue;
            }
            records.push(format!(
                "Tabela: {}\n\
                 Medida: {}\n\
                 Expressão: {}\n\
                 {RECORD_SEPARATOR}\n",
                table.name,
                measure.name,
                measure.expression_text(),
            ));
        }
    }
    records
}

fn source_records(model: &ModelDocument) -> Vec<String> {
    let mut records = Vec::new();
    for table in model.tables().iter().filter(|t| !t.is_reserved()) {
        for partition in &table.partitions {
            let source = partition.source.as_ref();
            let source_type = source.and_then(|s| s.source_type.as_deref());
            let expression = source
                .and_then(|s| s.expression.as_ref())
                .map(|e| e.joined().into_owned());
            records.push(format!(
                "Tabela: {}\n\
                 Modo de importação: {}\n\
                 Tipo de importação: {}\n\
                 Fonte: {}\n\
                 {RECORD_SEPARATOR}\n",
                table.name,
                partition.mode.as_deref().unwrap_or(MISSING_VALUE),
                source_type.unwrap_or(MISSING_VALUE),
                expression.as_deref().unwrap_or(MISSING_VALUE),
            ));
        }
    }
    records
}

fn relationship_records(model: &ModelDocument) -> Vec<String> {
    model
        .relationships()
        .iter()
        .filter(|rel| !rel.touches_reserved_table())
        .map(|rel| {
            format!(
                "Da tabela: {}\n\
                 Para tabela: {}\n\
                 Da coluna: {}\n\
                 Para coluna: {}\n\
                 {RECORD_SEPARATOR}\n",
                rel.from_table, rel.to_table, rel.from_column, rel.to_column,
            )
        })
        .collect()
}
