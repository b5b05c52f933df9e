//! Typed records for the two JSON payloads of a report package.
//!
//! The layout payload (`Report/Layout`) describes pages and the visuals placed
//! on them; the model payload (`DataModelSchema`) describes tables, columns,
//! measures, partitions and relationships. Every field the payloads may omit
//! is an explicit `Option` or carries `#[serde(default)]`, and the defaults
//! used when rendering are exposed as constants so the formatted text stays
//! stable.
//!
//! An explicit `null` never fails a whole document: collections and numbers
//! read it as their default, and text fields read it as [`MISSING_VALUE`]
//! while an absent key stays empty.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Prefixes of the date tables the modelling tool generates on its own.
///
/// Tables whose name starts with one of these are skipped by the tables,
/// sources and relationships extractors.
pub const RESERVED_TABLE_PREFIXES: &[&str] = &["DateTableTemplate", "LocalDateTable"];

/// Display name used for a page that has none.
pub const UNNAMED_PAGE: &str = "Sem Nome";

/// Text rendered for optional scalar fields that are absent from the payload
/// (visual type, partition mode, source type, source expression), and for
/// text fields explicitly set to `null`.
pub const MISSING_VALUE: &str = "None";

/// Column type tags that mark a column as calculated.
pub const CALCULATED_COLUMN_TAGS: &[&str] = &["calculatedTableColumn", "calculated"];

/// Returns `true` if `table` is an auto-generated date table.
///
/// # Examples
///
/// ```
/// use pbi_doc_core::is_reserved_table;
///
/// assert!(is_reserved_table("DateTableTemplate_6f1c"));
/// assert!(is_reserved_table("LocalDateTable_0a2b"));
/// assert!(!is_reserved_table("Sales"));
/// ```
pub fn is_reserved_table(table: &str) -> bool {
    RESERVED_TABLE_PREFIXES
        .iter()
        .any(|prefix| table.starts_with(prefix))
}

/// Reads `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads `null` as [`MISSING_VALUE`].
fn null_as_missing<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(|| MISSING_VALUE.to_string()))
}

// ---------------------------------------------------------------------------
// Layout payload
// ---------------------------------------------------------------------------

/// The report's visual layout: an ordered list of pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sections: Vec<Section>,
}

impl LayoutDocument {
    /// Converts an already parsed JSON tree into a layout document.
    ///
    /// An empty mapping (what the loader returns for an unreadable payload)
    /// converts to a document without sections.
    pub fn from_value(value: &serde_json::Value) -> serde_json::Result<Self> {
        Self::deserialize(value)
    }
}

/// One report page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visual_containers: Vec<VisualContainer>,
}

impl Section {
    /// Returns the page's display name, or [`UNNAMED_PAGE`].
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(UNNAMED_PAGE)
    }
}

/// One visual placed on a page.
///
/// The interesting data lives in `config`, a JSON document stored as a
/// string inside the layout JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualContainer {
    #[serde(default)]
    pub config: Option<String>,
}

impl VisualContainer {
    /// Parses the embedded `config` string.
    ///
    /// A missing or unparsable config yields an empty [`VisualConfig`].
    pub fn parsed_config(&self) -> VisualConfig {
        self.config
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}

/// Decoded form of [`VisualContainer::config`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualConfig {
    #[serde(default)]
    pub single_visual: Option<SingleVisual>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub layouts: Vec<VisualLayout>,
}

impl VisualConfig {
    /// The visual's type tag (e.g. `barChart`), if declared.
    pub fn visual_type(&self) -> Option<&str> {
        self.single_visual
            .as_ref()
            .and_then(|visual| visual.visual_type.as_deref())
    }

    /// Position of the first layout entry, or an all-zero rectangle.
    pub fn position(&self) -> Position {
        self.layouts
            .first()
            .and_then(|layout| layout.position)
            .unwrap_or_default()
    }

    /// Every non-empty `queryRef` across all projection roles, in document
    /// order.
    pub fn query_refs(&self) -> Vec<&str> {
        let Some(visual) = &self.single_visual else {
            return Vec::new();
        };
        visual
            .projections
            .values()
            .flatten()
            .filter_map(|projection| projection.query_ref.as_deref())
            .filter(|query_ref| !query_ref.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleVisual {
    #[serde(default)]
    pub visual_type: Option<String>,
    /// Projection role (e.g. `Y`, `Category`) to the fields bound to it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub projections: IndexMap<String, Vec<Projection>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    #[serde(default)]
    pub query_ref: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualLayout {
    #[serde(default)]
    pub position: Option<Position>,
}

/// Placement rectangle of a visual, in report units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, deserialize_with = "null_as_default")]
    pub x: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub y: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub width: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub height: f64,
}

impl Position {
    /// Truncates a coordinate toward zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbi_doc_core::Position;
    ///
    /// assert_eq!(Position::truncate(10.7), 10);
    /// assert_eq!(Position::truncate(-3.9), -3);
    /// ```
    pub fn truncate(value: f64) -> i64 {
        value.trunc() as i64
    }
}

// ---------------------------------------------------------------------------
// Model payload
// ---------------------------------------------------------------------------

/// The semantic data model document (`DataModelSchema`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub model: Option<SemanticModel>,
}

impl ModelDocument {
    /// Converts an already parsed JSON tree into a model document.
    pub fn from_value(value: &serde_json::Value) -> serde_json::Result<Self> {
        Self::deserialize(value)
    }

    /// Tables in declaration order (empty when the model is absent).
    pub fn tables(&self) -> &[Table] {
        self.model
            .as_ref()
            .map(|model| model.tables.as_slice())
            .unwrap_or_default()
    }

    /// Relationships in declaration order (empty when the model is absent).
    pub fn relationships(&self) -> &[Relationship] {
        self.model
            .as_ref()
            .map(|model| model.relationships.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticModel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tables: Vec<Table>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: Vec<Relationship>,
}

/// One data table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default, deserialize_with = "null_as_missing")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub columns: Vec<Column>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub measures: Vec<Measure>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub partitions: Vec<Partition>,
}

impl Table {
    /// Returns `true` for auto-generated date tables.
    pub fn is_reserved(&self) -> bool {
        is_reserved_table(&self.name)
    }
}

/// Whether a column is loaded from the source or computed in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Authored,
    Calculated,
}

/// One table column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default, deserialize_with = "null_as_missing")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_missing")]
    pub data_type: String,
    /// Raw type tag (`calculated`, `calculatedTableColumn`, ...).
    #[serde(default, rename = "type")]
    pub type_tag: Option<String>,
}

impl Column {
    /// Classifies the column from its type tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbi_doc_core::{Column, ColumnKind};
    ///
    /// let mut column = Column::default();
    /// assert_eq!(column.kind(), ColumnKind::Authored);
    ///
    /// column.type_tag = Some("calculatedTableColumn".into());
    /// assert_eq!(column.kind(), ColumnKind::Calculated);
    /// ```
    pub fn kind(&self) -> ColumnKind {
        match self.type_tag.as_deref() {
            Some(tag) if CALCULATED_COLUMN_TAGS.contains(&tag) => ColumnKind::Calculated,
            _ => ColumnKind::Authored,
        }
    }
}

/// A DAX or M expression, stored either as one string or as a list of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expression {
    Text(String),
    Lines(Vec<String>),
}

impl Expression {
    /// Collapses the expression to a single line.
    ///
    /// Line lists are joined with single spaces and blank lines are dropped;
    /// the lines themselves are kept as written.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbi_doc_core::Expression;
    ///
    /// let expr = Expression::Lines(vec![
    ///     "CALCULATE(".into(),
    ///     "   ".into(),
    ///     "SUM(Sales[Amount]))".into(),
    /// ]);
    /// assert_eq!(expr.joined(), "CALCULATE( SUM(Sales[Amount]))");
    /// ```
    pub fn joined(&self) -> Cow<'_, str> {
        match self {
            Expression::Text(text) => Cow::Borrowed(text),
            Expression::Lines(lines) => Cow::Owned(
                lines
                    .iter()
                    .map(String::as_str)
                    .filter(|line| !line.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }
}

/// One DAX measure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    #[serde(default, deserialize_with = "null_as_missing")]
    pub name: String,
    #[serde(default)]
    pub expression: Option<Expression>,
}

impl Measure {
    /// The joined expression, empty when absent.
    pub fn expression_text(&self) -> Cow<'_, str> {
        self.expression
            .as_ref()
            .map_or(Cow::Borrowed(""), Expression::joined)
    }
}

/// A table's data-load definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub source: Option<PartitionSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionSource {
    #[serde(default, rename = "type")]
    pub source_type: Option<String>,
    #[serde(default)]
    pub expression: Option<Expression>,
}

/// A join between two table columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default, deserialize_with = "null_as_missing")]
    pub from_table: String,
    #[serde(default, deserialize_with = "null_as_missing")]
    pub from_column: String,
    #[serde(default, deserialize_with = "null_as_missing")]
    pub to_table: String,
    #[serde(default, deserialize_with = "null_as_missing")]
    pub to_column: String,
}

impl Relationship {
    /// Returns `true` if either endpoint is an auto-generated date table.
    pub fn touches_reserved_table(&self) -> bool {
        is_reserved_table(&self.from_table) || is_reserved_table(&self.to_table)
    }
}
