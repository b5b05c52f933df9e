//! Integration tests for the pbi-doc-docx crate.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use pbi_doc_core::{Category, LayoutDocument, ModelDocument, extract_all};
use pbi_doc_docx::{DOCUMENT_PART, DocumentRenderer, body_paragraphs, read_part};
use serde_json::json;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;

fn paragraph(text: &str) -> String {
    format!(r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#)
}

/// Builds a template with the two labels and the given anchors.
fn write_template(path: &Path, anchors: &[&str]) {
    let mut body = String::new();
    body.push_str(&paragraph("Nome do Relatório:"));
    body.push_str(&paragraph("Data da documentação:"));
    for anchor in anchors {
        body.push_str(&paragraph(anchor));
        body.push_str(&paragraph("Descrição"));
    }
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );

    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    writer.start_file("[Content_Types].xml", deflated).unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer.start_file(DOCUMENT_PART, deflated).unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.start_file("word/styles.xml", deflated).unwrap();
    writer.write_all(STYLES.as_bytes()).unwrap();
    writer
        .start_file("word/media/image1.png", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(&[0x89, b'P', b'N', b'G', 0, 1, 2, 3]).unwrap();
    writer.finish().unwrap();
}

fn sample_results() -> Vec<pbi_doc_core::ExtractionResult> {
    let layout = LayoutDocument::from_value(&json!({
        "sections": [{
            "displayName": "Sales",
            "visualContainers": [{
                "config": "{\"singleVisual\":{\"visualType\":\"barChart\",\"projections\":{\"Y\":[{\"queryRef\":\"TotalSales\"}]}},\"layouts\":[{\"position\":{\"x\":10.7,\"y\":20.2,\"width\":300,\"height\":150}}]}"
            }]
        }]
    }))
    .unwrap();
    let model = ModelDocument::from_value(&json!({
        "model": {
            "tables": [
                {"name": "DateTableTemplate_1", "columns": [{"name": "Date"}]},
                {
                    "name": "Sales",
                    "columns": [{"name": "Amount", "dataType": "double"}],
                    "measures": [{"name": "TotalSales", "expression": ["SUM(", "  Sales[Amount])"]}],
                    "partitions": [{"mode": "import", "source": {"type": "m", "expression": "let x = 1 in x"}}]
                }
            ],
            "relationships": [
                {"fromTable": "Sales", "fromColumn": "Date", "toTable": "DateTableTemplate_1", "toColumn": "Date"}
            ]
        }
    }))
    .unwrap();
    extract_all(&layout, &model)
}

fn renderer() -> DocumentRenderer {
    DocumentRenderer::with_date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
}

fn document_xml(path: &Path) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    read_part(&mut archive, DOCUMENT_PART).unwrap()
}

const ALL_ANCHORS: [&str; 6] = [
    "Páginas",
    "Tabelas",
    "Medidas",
    "Visuais",
    "Fontes",
    "Relacionamentos",
];

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn test_full_template_receives_every_section() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("modelo.docx");
    write_template(&template, &ALL_ANCHORS);
    let target = dir.path().join("Sales_documentado.docx");

    let outcome = renderer()
        .render("Sales", &sample_results(), &template, &target)
        .unwrap();
    assert_eq!(outcome.inserted, Category::ALL.to_vec());

    let texts = body_paragraphs(&document_xml(&outcome.path)).unwrap();
    assert_eq!(texts[0], "Nome do Relatório: Sales");
    assert_eq!(texts[1], "Data da documentação: 31/12/2024");
    assert_eq!(texts[2], "Páginas");
    assert_eq!(texts[3], "\nSales\n-----------\n");
    assert_eq!(texts[4], "Descrição");

    let visuals = texts.iter().position(|t| t == "Visuais").unwrap();
    assert_eq!(
        texts[visuals + 1],
        "\nPágina: Sales\nX: 10\nY: 20\nAltura: 150\nLargura: 300\nTipo de visual: barChart\nMedidas utilizadas: TotalSales\n-----------\n"
    );

    let measures = texts.iter().position(|t| t == "Medidas").unwrap();
    assert!(texts[measures + 1].contains("Expressão: SUM(   Sales[Amount])"));

    let relationships = texts.iter().position(|t| t == "Relacionamentos").unwrap();
    assert_eq!(texts[relationships + 1], "");
}

#[test]
fn test_missing_anchor_omits_only_that_section() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("modelo.docx");
    let anchors: Vec<&str> = ALL_ANCHORS
        .iter()
        .copied()
        .filter(|a| *a != "Medidas")
        .collect();
    write_template(&template, &anchors);

    let outcome = renderer()
        .render(
            "Sales",
            &sample_results(),
            &template,
            &dir.path().join("out.docx"),
        )
        .unwrap();
    assert_eq!(outcome.inserted.len(), 5);
    assert!(!outcome.was_inserted(Category::Measures));

    let xml = String::from_utf8(document_xml(&outcome.path)).unwrap();
    assert!(!xml.contains("Medida: TotalSales"));
    assert!(xml.contains("Tabela: Sales"));
}

#[test]
fn test_unrelated_parts_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("modelo.docx");
    write_template(&template, &ALL_ANCHORS);

    let outcome = renderer()
        .render(
            "Sales",
            &sample_results(),
            &template,
            &dir.path().join("out.docx"),
        )
        .unwrap();

    let mut source = ZipArchive::new(File::open(&template).unwrap()).unwrap();
    let mut output = ZipArchive::new(File::open(&outcome.path).unwrap()).unwrap();
    let source_names: Vec<String> = source.file_names().map(String::from).collect();
    let output_names: Vec<String> = output.file_names().map(String::from).collect();
    assert_eq!(source_names, output_names);

    for name in ["[Content_Types].xml", "word/styles.xml", "word/media/image1.png"] {
        assert_eq!(
            read_part(&mut source, name).unwrap(),
            read_part(&mut output, name).unwrap(),
            "{name} changed"
        );
    }
}

#[test]
fn test_repeated_runs_are_versioned_and_identical() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("modelo.docx");
    write_template(&template, &ALL_ANCHORS);
    let target = dir.path().join("Report1_documentado.docx");
    let results = sample_results();

    let paths: Vec<_> = (0..3)
        .map(|_| {
            renderer()
                .render("Report1", &results, &template, &target)
                .unwrap()
                .path
        })
        .collect();

    assert_eq!(paths[0], target);
    assert_eq!(paths[1], dir.path().join("Report1_documentado_versão_02.docx"));
    assert_eq!(paths[2], dir.path().join("Report1_documentado_versão_03.docx"));
    assert_eq!(document_xml(&paths[0]), document_xml(&paths[1]));
    assert_eq!(document_xml(&paths[1]), document_xml(&paths[2]));
}

#[test]
fn test_template_is_not_modified() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("modelo.docx");
    write_template(&template, &ALL_ANCHORS);
    let before = std::fs::read(&template).unwrap();

    renderer()
        .render(
            "Sales",
            &sample_results(),
            &template,
            &dir.path().join("out.docx"),
        )
        .unwrap();
    assert_eq!(std::fs::read(&template).unwrap(), before);
}
