//! The documentation pipeline.
//!
//! A run moves through fixed states:
//!
//! ```text
//! Init → Unpacked → Loaded → Reverted → Extracted → Rendered → Done
//!   └──────────┴─────────┴─────────┴──────────┴──────────┴──→ Failed
//! ```
//!
//! The package is renamed to its archive name only between `Init` and
//! `Reverted`. Every failure in that window still restores the original
//! name before the error is returned.

use std::fmt;
use std::path::{Path, PathBuf};

use pbi_doc_container::{LAYOUT_ENTRY, MODEL_ENTRY, PackagedReport, load_payload};
use pbi_doc_core::{Category, ExtractionResult, LayoutDocument, ModelDocument, extract_category};
use pbi_doc_docx::DocumentRenderer;
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{PipelineError, Result};
use crate::report::{FailureCode, RunReport, SectionReport};

/// Suffix appended to the report name to form the output file name.
pub const OUTPUT_SUFFIX: &str = "_documentado.docx";

/// Prefix of the private working directory created next to the package.
pub const WORKDIR_PREFIX: &str = ".pbi-doc-";

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    /// Payload entries copied out of the package.
    Unpacked,
    /// Payloads decoded and parsed.
    Loaded,
    /// Package back under its original name.
    Reverted,
    /// All six blocks formatted.
    Extracted,
    /// Output document written.
    Rendered,
    Done,
    Failed(FailureCode),
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Unpacked => write!(f, "unpacked"),
            Self::Loaded => write!(f, "loaded"),
            Self::Reverted => write!(f, "reverted"),
            Self::Extracted => write!(f, "extracted"),
            Self::Rendered => write!(f, "rendered"),
            Self::Done => write!(f, "done"),
            Self::Failed(code) => write!(f, "failed ({code})"),
        }
    }
}

/// Typed payloads of one package.
#[derive(Debug, Clone, Default)]
pub struct LoadedReport {
    /// Package base name (`Sales.pbit` → `Sales`).
    pub report_name: String,
    pub layout: LayoutDocument,
    pub model: ModelDocument,
}

impl LoadedReport {
    /// Runs all six extractors. See [`extract_parallel`].
    pub fn extract(&self) -> Vec<ExtractionResult> {
        extract_parallel(&self.layout, &self.model)
    }
}

/// Runs the six extractors concurrently, returning results in
/// [`Category::ALL`] order.
pub fn extract_parallel(layout: &LayoutDocument, model: &ModelDocument) -> Vec<ExtractionResult> {
    Category::ALL
        .as_slice()
        .par_iter()
        .map(|category| extract_category(*category, layout, model))
        .collect()
}

/// One documentation run.
///
/// # Examples
///
/// ```no_run
/// use pbi_doc_generator::Pipeline;
///
/// let mut pipeline = Pipeline::new("reports/Sales.pbit")
///     .template("templates/modelo.docx")
///     .output_dir("docs");
/// match pipeline.run() {
///     Ok(report) => println!("written to {}", report.output.display()),
///     Err(err) => eprintln!("{} ({})", err, err.code()),
/// }
/// ```
#[derive(Debug)]
pub struct Pipeline {
    package: PathBuf,
    template: Option<PathBuf>,
    output_dir: PathBuf,
    renderer: DocumentRenderer,
    state: PipelineState,
}

impl Pipeline {
    /// A pipeline for `package`, writing to the current directory.
    pub fn new(package: impl Into<PathBuf>) -> Self {
        Self {
            package: package.into(),
            template: None,
            output_dir: PathBuf::from("."),
            renderer: DocumentRenderer::new(),
            state: PipelineState::Init,
        }
    }

    /// Sets the Word template. Required by [`run`](Self::run).
    pub fn template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Sets the directory the document is written to.
    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Replaces the renderer, e.g. to pin the documentation date.
    pub fn renderer(mut self, renderer: DocumentRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Runs every step and writes the document.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; the pipeline is then in
    /// [`PipelineState::Failed`] with the matching code. The package is at
    /// its original path whatever the outcome, unless restoring it is what
    /// failed.
    pub fn run(&mut self) -> Result<RunReport> {
        self.state = PipelineState::Init;
        let outcome = self.check_inputs().and_then(|template| {
            let loaded = self.load_steps()?;
            self.render_steps(&loaded, &template)
        });
        self.finish(outcome)
    }

    /// Reads the package without rendering anything.
    ///
    /// Stops in [`PipelineState::Reverted`] on success.
    pub fn load(&mut self) -> Result<LoadedReport> {
        self.state = PipelineState::Init;
        let outcome = self
            .require_dir("package directory", parent_dir(&self.package))
            .and_then(|()| self.load_steps());
        match outcome {
            Ok(loaded) => Ok(loaded),
            Err(err) => self.finish(Err(err)),
        }
    }

    fn finish<T>(&mut self, outcome: Result<T>) -> Result<T> {
        match &outcome {
            Ok(_) => {
                self.advance(PipelineState::Done);
            }
            Err(err) => {
                self.state = PipelineState::Failed(err.code());
                error!(
                    package = %self.package.display(),
                    code = %err.code(),
                    "documentation run failed: {err}"
                );
            }
        }
        outcome
    }

    fn advance(&mut self, state: PipelineState) {
        debug!(from = %self.state, to = %state, "pipeline state");
        self.state = state;
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    fn check_inputs(&self) -> Result<PathBuf> {
        let template = self.template.clone().ok_or_else(|| PipelineError::MissingInput {
            what: "template",
            path: PathBuf::new(),
        })?;
        self.require_dir("package directory", parent_dir(&self.package))?;
        self.require_dir("template directory", parent_dir(&template))?;
        self.require_dir("output directory", &self.output_dir)?;
        if !template.is_file() {
            return Err(PipelineError::MissingInput {
                what: "template",
                path: template,
            });
        }
        Ok(template)
    }

    fn require_dir(&self, what: &'static str, dir: &Path) -> Result<()> {
        if dir.is_dir() {
            Ok(())
        } else {
            Err(PipelineError::MissingInput {
                what,
                path: dir.to_path_buf(),
            })
        }
    }

    fn load_steps(&mut self) -> Result<LoadedReport> {
        let package = PackagedReport::new(&self.package);
        let report_name = package.report_name();
        info!(report = %report_name, package = %self.package.display(), "processing report");

        let workdir_parent = parent_dir(&self.package);
        let workdir = tempfile::Builder::new()
            .prefix(WORKDIR_PREFIX)
            .tempdir_in(workdir_parent)
            .map_err(|source| PipelineError::Workdir {
                path: workdir_parent.to_path_buf(),
                source,
            })?;

        let view = package.open()?;
        let paths = view.extract_entries(workdir.path(), &[LAYOUT_ENTRY, MODEL_ENTRY])?;
        self.advance(PipelineState::Unpacked);

        let layout = load_payload(&paths[0])?;
        let model = load_payload(&paths[1])?;
        self.advance(PipelineState::Loaded);

        let original = view.original_path().to_path_buf();
        view.close().map_err(|source| PipelineError::RevertFailed {
            path: original,
            source,
        })?;
        self.advance(PipelineState::Reverted);

        Ok(LoadedReport {
            report_name,
            layout: typed_or_default(&layout, LAYOUT_ENTRY, LayoutDocument::from_value),
            model: typed_or_default(&model, MODEL_ENTRY, ModelDocument::from_value),
        })
    }

    fn render_steps(&mut self, loaded: &LoadedReport, template: &Path) -> Result<RunReport> {
        let results = loaded.extract();
        self.advance(PipelineState::Extracted);

        let target = self
            .output_dir
            .join(format!("{}{OUTPUT_SUFFIX}", loaded.report_name));
        let outcome = self
            .renderer
            .render(&loaded.report_name, &results, template, &target)?;
        self.advance(PipelineState::Rendered);

        info!(path = %outcome.path.display(), "documentation generated");
        Ok(RunReport {
            report_name: loaded.report_name.clone(),
            package: self.package.clone(),
            generated_on: self.renderer.generated_on().format("%Y-%m-%d").to_string(),
            sections: results
                .iter()
                .map(|result| SectionReport {
                    category: result.category,
                    records: result.records,
                    inserted: outcome.was_inserted(result.category),
                })
                .collect(),
            output: outcome.path,
        })
    }
}

/// Runs the whole pipeline and returns the written document's path.
///
/// Failures are logged and reduced to `None`; use [`Pipeline::run`] to get
/// the error itself.
pub fn generate(package: &Path, template: &Path, output_dir: &Path) -> Option<PathBuf> {
    Pipeline::new(package)
        .template(template)
        .output_dir(output_dir)
        .run()
        .ok()
        .map(|report| report.output)
}

/// Directory containing `path`; `.` for bare file names.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Converts a payload to its typed view, treating a shape mismatch like a
/// malformed payload.
fn typed_or_default<T: Default>(
    value: &Value,
    entry: &str,
    convert: impl FnOnce(&Value) -> serde_json::Result<T>,
) -> T {
    convert(value).unwrap_or_else(|err| {
        warn!(entry, %err, "payload has an unexpected shape; treating it as empty");
        T::default()
    })
}
