use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator line closing every record in a block.
pub const RECORD_SEPARATOR: &str = "-----------";

/// Information category produced by one extractor.
///
/// Each category maps to a fixed, title-cased label that doubles as the
/// anchor paragraph text in the document template.
///
/// # Examples
///
/// ```
/// use pbi_doc_core::Category;
///
/// assert_eq!(Category::Measures.label(), "Medidas");
/// assert_eq!(Category::from_label("Fontes"), Some(Category::Sources));
/// assert_eq!(Category::from_label("fontes"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Páginas")]
    Pages,
    #[serde(rename = "Tabelas")]
    Tables,
    #[serde(rename = "Medidas")]
    Measures,
    #[serde(rename = "Visuais")]
    Visuals,
    #[serde(rename = "Fontes")]
    Sources,
    #[serde(rename = "Relacionamentos")]
    Relationships,
}

impl Category {
    /// All categories, in the order their blocks are produced.
    pub const ALL: [Category; 6] = [
        Category::Pages,
        Category::Tables,
        Category::Measures,
        Category::Visuals,
        Category::Sources,
        Category::Relationships,
    ];

    /// The anchor label for this category.
    pub fn label(self) -> &'static str {
        match self {
            Category::Pages => "Páginas",
            Category::Tables => "Tabelas",
            Category::Measures => "Medidas",
            Category::Visuals => "Visuais",
            Category::Sources => "Fontes",
            Category::Relationships => "Relacionamentos",
        }
    }

    /// Looks up a category by its exact (case-sensitive) label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One formatted text block, tagged with its category.
///
/// The block is the list `["", record, record, ...]` joined with newlines,
/// so a non-empty block starts with a newline and an empty category yields
/// an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub category: Category,
    pub text: String,
    /// Number of records in the block.
    pub records: usize,
}

impl ExtractionResult {
    /// Assembles a block from already formatted records.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbi_doc_core::{Category, ExtractionResult};
    ///
    /// let result = ExtractionResult::from_records(
    ///     Category::Pages,
    ///     vec!["Home\n-----------\n".to_string()],
    /// );
    /// assert_eq!(result.text, "\nHome\n-----------\n");
    /// assert_eq!(result.records, 1);
    ///
    /// let empty = ExtractionResult::from_records(Category::Pages, Vec::new());
    /// assert!(empty.text.is_empty());
    /// ```
    pub fn from_records(category: Category, records: Vec<String>) -> Self {
        let count = records.len();
        let mut parts = Vec::with_capacity(count + 1);
        parts.push(String::new());
        parts.extend(records);
        Self {
            category,
            text: parts.join("\n"),
            records: count,
        }
    }

    /// Returns `true` if the block holds no records.
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Category::Pages).unwrap();
        assert_eq!(json, "\"Páginas\"");
        let back: Category = serde_json::from_str("\"Relacionamentos\"").unwrap();
        assert_eq!(back, Category::Relationships);
    }

    #[test]
    fn test_records_joined_with_leading_newline() {
        let result = ExtractionResult::from_records(
            Category::Tables,
            vec!["a\n-----------\n".into(), "b\n-----------\n".into()],
        );
        assert_eq!(result.text, "\na\n-----------\n\nb\n-----------\n");
        assert!(!result.is_empty());
    }
}
