//! Output formatting for extraction results and run reports.

use pbi_doc_core::ExtractionResult;

use crate::report::RunReport;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Markdown,
    Json,
    Yaml,
}

/// Formats extraction results in the requested output format.
pub fn format_results(
    results: &[ExtractionResult],
    format: OutputFormat,
) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(results)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(results).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(results_to_markdown(results)),
    }
}

/// Formats a run report in the requested output format.
pub fn format_run_report(report: &RunReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(run_report_to_markdown(report)),
    }
}

fn results_to_markdown(results: &[ExtractionResult]) -> String {
    let mut out = String::new();

    for result in results {
        out.push_str(&format!("## {}\n", result.category));
        if result.is_empty() {
            out.push_str("\n_(vazio)_\n");
        } else {
            out.push_str(&result.text);
        }
        out.push('\n');
    }

    out
}

fn run_report_to_markdown(report: &RunReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Documentação: {}\n\n", report.report_name));
    out.push_str(&format!("- **Pacote:** {}\n", report.package.display()));
    out.push_str(&format!("- **Documento:** {}\n", report.output.display()));
    out.push_str(&format!("- **Data:** {}\n\n", report.generated_on));

    out.push_str("| Seção | Registros | Inserida |\n");
    out.push_str("|-------|-----------|----------|\n");
    for section in &report.sections {
        let inserted = if section.inserted { "sim" } else { "não" };
        out.push_str(&format!(
            "| {} | {} | {inserted} |\n",
            section.category, section.records
        ));
    }

    out
}
