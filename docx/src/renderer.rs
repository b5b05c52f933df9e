//! Template rendering.
//!
//! A `.docx` file is a zip package; the body text lives in the
//! `word/document.xml` part. Rendering rewrites that part with
//! [`fill_body`](crate::fill_body) and copies every other part as stored
//! (compressed bytes included), so styles, headers, images and settings come
//! through unchanged.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pbi_doc_core::{Category, ExtractionResult};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::body::{BodyFill, fill_body};
use crate::error::{RenderError, Result};
use crate::versioning::resolve_output_path;

/// Package part holding the main document body.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// `strftime` pattern of the documentation date.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// What a render produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Final (possibly versioned) output path.
    pub path: PathBuf,
    /// Categories whose anchor paragraph was found, in insertion order.
    pub inserted: Vec<Category>,
}

impl RenderOutcome {
    /// Returns `true` if `category`'s block made it into the document.
    pub fn was_inserted(&self, category: Category) -> bool {
        self.inserted.contains(&category)
    }
}

/// Renders extraction results into a Word template.
///
/// # Examples
///
/// ```no_run
/// use chrono::NaiveDate;
/// use pbi_doc_core::{LayoutDocument, ModelDocument, extract_all};
/// use pbi_doc_docx::DocumentRenderer;
///
/// let results = extract_all(&LayoutDocument::default(), &ModelDocument::default());
/// let renderer = DocumentRenderer::with_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
/// let outcome = renderer
///     .render("Sales", &results, "modelo.docx".as_ref(), "out/Sales_documentado.docx".as_ref())
///     .unwrap();
/// println!("written to {}", outcome.path.display());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentRenderer {
    generated_on: NaiveDate,
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::with_date(chrono::Local::now().date_naive())
    }
}

impl DocumentRenderer {
    /// A renderer stamping today's local date.
    pub fn new() -> Self {
        Self::default()
    }

    /// A renderer stamping a fixed date.
    pub fn with_date(generated_on: NaiveDate) -> Self {
        Self { generated_on }
    }

    pub fn generated_on(&self) -> NaiveDate {
        self.generated_on
    }

    /// Writes the filled template to `target_path`, or to its first free
    /// versioned sibling if `target_path` is taken.
    ///
    /// Results are inserted in slice order. A category without an anchor
    /// paragraph in the template is skipped with a warning.
    ///
    /// # Errors
    ///
    /// - [`RenderError::TemplateNotFound`] if the template does not exist.
    /// - [`RenderError::InvalidTemplate`] if it is not a zip package.
    /// - [`RenderError::MissingPart`] if it has no `word/document.xml`.
    /// - [`RenderError::PersistFailed`] if the output cannot be moved into
    ///   place (including when another writer claimed the name first).
    pub fn render(
        &self,
        report_name: &str,
        results: &[ExtractionResult],
        template_path: &Path,
        target_path: &Path,
    ) -> Result<RenderOutcome> {
        if !template_path.is_file() {
            return Err(RenderError::TemplateNotFound {
                path: template_path.to_path_buf(),
            });
        }
        let mut template = ZipArchive::new(File::open(template_path)?).map_err(|e| {
            RenderError::InvalidTemplate {
                path: template_path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let document = read_part(&mut template, DOCUMENT_PART)?;
        let date = self.generated_on.format(DATE_FORMAT).to_string();
        let fill = BodyFill {
            report_name,
            generated_on: &date,
            blocks: results
                .iter()
                .map(|result| (result.category.label(), result.text.as_str()))
                .collect(),
        };
        let (filled, found) = fill_body(&document, &fill)?;

        let mut inserted = Vec::new();
        for (result, found) in results.iter().zip(found) {
            if found {
                debug!(category = %result.category, records = result.records, "block inserted");
                inserted.push(result.category);
            } else {
                warn!(category = %result.category, "anchor paragraph not found; section omitted");
            }
        }

        let final_path = resolve_output_path(target_path);
        let directory = match final_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::NamedTempFile::new_in(directory)?;
        write_package(&mut template, &filled, staged.as_file_mut())?;
        staged
            .persist_noclobber(&final_path)
            .map_err(|e| RenderError::PersistFailed {
                path: final_path.clone(),
                source: e.error,
            })?;

        info!(
            report = report_name,
            path = %final_path.display(),
            sections = inserted.len(),
            "document rendered"
        );
        Ok(RenderOutcome {
            path: final_path,
            inserted,
        })
    }
}

/// Renders with today's date and returns the final output path.
///
/// See [`DocumentRenderer::render`].
pub fn render(
    report_name: &str,
    results: &[ExtractionResult],
    template_path: &Path,
    target_path: &Path,
) -> Result<PathBuf> {
    DocumentRenderer::new()
        .render(report_name, results, template_path, target_path)
        .map(|outcome| outcome.path)
}

/// Reads a whole package part into memory.
pub fn read_part<R: Read + std::io::Seek>(
    package: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>> {
    let mut part = package.by_name(name).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => RenderError::MissingPart {
            part: name.to_string(),
        },
        other => RenderError::ZipError(other),
    })?;
    let mut bytes = Vec::new();
    part.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Copies `template` into `out`, replacing the document part with `document`.
fn write_package<R: Read + std::io::Seek>(
    template: &mut ZipArchive<R>,
    document: &[u8],
    out: &mut File,
) -> Result<()> {
    let mut writer = ZipWriter::new(out);
    for index in 0..template.len() {
        let entry = template.by_index_raw(index)?;
        if entry.name() == DOCUMENT_PART {
            let options = SimpleFileOptions::default().compression_method(entry.compression());
            writer.start_file(DOCUMENT_PART, options)?;
            writer.write_all(document)?;
        } else {
            writer.raw_copy_file(entry)?;
        }
    }
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

    fn write_template(path: &Path, body: &str) {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(CONTENT_TYPES.as_bytes()).unwrap();
        writer.start_file(DOCUMENT_PART, options).unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.finish().unwrap();
    }

    fn document_text(path: &Path) -> String {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        String::from_utf8(read_part(&mut archive, DOCUMENT_PART).unwrap()).unwrap()
    }

    fn renderer() -> DocumentRenderer {
        DocumentRenderer::with_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
    }

    fn results() -> Vec<ExtractionResult> {
        vec![
            ExtractionResult::from_records(Category::Pages, vec!["Home\n-----------\n".into()]),
            ExtractionResult::from_records(
                Category::Measures,
                vec!["Medida: Total\n-----------\n".into()],
            ),
        ]
    }

    #[test]
    fn test_render_fills_labels_and_anchors() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("modelo.docx");
        write_template(
            &template,
            "<w:p><w:r><w:t>Nome do Relatório:</w:t></w:r></w:p><w:p><w:r><w:t>Data da documentação:</w:t></w:r></w:p><w:p><w:r><w:t>Páginas</w:t></w:r></w:p>",
        );
        let target = dir.path().join("Sales_documentado.docx");

        let outcome = renderer()
            .render("Sales", &results(), &template, &target)
            .unwrap();
        assert_eq!(outcome.path, target);
        assert!(outcome.was_inserted(Category::Pages));
        assert!(!outcome.was_inserted(Category::Measures));

        let xml = document_text(&target);
        assert!(xml.contains(" Sales</w:t>"));
        assert!(xml.contains(" 05/03/2024</w:t>"));
        assert!(xml.contains(">Home</w:t>"));
        assert!(!xml.contains("Medida: Total"));
    }

    #[test]
    fn test_render_copies_other_parts() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("modelo.docx");
        write_template(&template, "<w:p/>");
        let target = dir.path().join("out.docx");

        renderer().render("Sales", &[], &template, &target).unwrap();

        let mut archive = ZipArchive::new(File::open(&target).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names.len(), 2);
        let content_types = read_part(&mut archive, "[Content_Types].xml").unwrap();
        assert_eq!(content_types, CONTENT_TYPES.as_bytes());
    }

    #[test]
    fn test_render_versions_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("modelo.docx");
        write_template(&template, "<w:p><w:r><w:t>Páginas</w:t></w:r></w:p>");
        let target = dir.path().join("Sales_documentado.docx");

        let first = renderer().render("Sales", &results(), &template, &target).unwrap();
        let second = renderer().render("Sales", &results(), &template, &target).unwrap();
        assert_eq!(first.path, target);
        assert_eq!(
            second.path,
            dir.path().join("Sales_documentado_versão_02.docx")
        );
        assert_eq!(document_text(&first.path), document_text(&second.path));
    }

    #[test]
    fn test_render_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let err = renderer()
            .render("Sales", &[], &dir.path().join("none.docx"), &dir.path().join("o.docx"))
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_render_template_without_document_part() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("modelo.docx");
        let mut writer = ZipWriter::new(File::create(&template).unwrap());
        writer
            .start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        writer.finish().unwrap();

        let target = dir.path().join("o.docx");
        let err = renderer().render("Sales", &[], &template, &target).unwrap_err();
        assert!(matches!(err, RenderError::MissingPart { .. }));
        assert!(!target.exists());
    }

    #[test]
    fn test_render_rejects_non_zip_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("modelo.docx");
        std::fs::write(&template, b"plain text").unwrap();

        let err = renderer()
            .render("Sales", &[], &template, &dir.path().join("o.docx"))
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidTemplate { .. }));
    }
}
