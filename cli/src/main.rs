use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Args, Parser, Subcommand};
use pbi_doc_container::{DocConfig, LoggingConfig, convert_pbix_to_pbit};
use pbi_doc_core::{Category, extract_category};
use pbi_doc_generator::output::{format_results, format_run_report};
use pbi_doc_generator::{Pipeline, PipelineError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Markdown,
    Json,
    Yaml,
}

impl From<CliOutputFormat> for pbi_doc_generator::output::OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Markdown => Self::Markdown,
            CliOutputFormat::Json => Self::Json,
            CliOutputFormat::Yaml => Self::Yaml,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pbi-doc")]
#[command(about = "Generate Word documentation from Power BI report packages")]
struct Cli {
    /// YAML configuration file with default template, output directory and logging.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Document a .pbit package into a copy of a Word template.
    Generate(GenerateArgs),
    /// Print the extracted metadata blocks without rendering a document.
    Extract(ExtractArgs),
    /// Write a data-free .pbit template next to a .pbix report.
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Report package (.pbit) to document.
    #[arg(long)]
    package: PathBuf,
    /// Word template with the anchor paragraphs (overrides the config).
    #[arg(long)]
    template: Option<PathBuf>,
    /// Directory the document is written to (overrides the config).
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Print the run report in this format instead of the output path.
    #[arg(long)]
    report: Option<CliOutputFormat>,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Report package (.pbit) to read.
    #[arg(long)]
    package: PathBuf,
    /// Only print this category (e.g. "Medidas").
    #[arg(long)]
    category: Option<String>,
    /// Output format.
    #[arg(long, default_value = "markdown")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Report (.pbix) to convert.
    #[arg(long)]
    input: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let result = load_config(cli.config.as_ref()).and_then(|config| {
        init_logging(&config.logging)?;
        match cli.command {
            Command::Generate(args) => run_generate(args, &config),
            Command::Extract(args) => run_extract(args, &config),
            Command::Convert(args) => run_convert(args),
        }
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<DocConfig, String> {
    match path {
        Some(path) => DocConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(DocConfig::default()),
    }
}

/// Installs a subscriber writing to stderr and appending to the log file.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), String> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logging.file)
        .map_err(|err| {
            format!(
                "Failed to open log file '{}': {err}",
                logging.file.display()
            )
        })?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|err| format!("Invalid log level '{}': {err}", logging.level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .map_err(|err| format!("Failed to install logger: {err}"))
}

fn run_generate(args: GenerateArgs, config: &DocConfig) -> Result<(), String> {
    let template = config
        .template_or(args.template.as_deref())
        .ok_or_else(|| {
            "No template given: pass --template or set `template` in the config file".to_string()
        })?
        .to_path_buf();
    let output_dir = config.output_dir_or(args.output_dir.as_deref());

    let mut pipeline = Pipeline::new(&args.package)
        .template(template)
        .output_dir(output_dir);
    let report = pipeline
        .run()
        .map_err(|err| failure_message(&err, &config.logging))?;

    match args.report {
        Some(format) => println!("{}", format_run_report(&report, format.into())?),
        None => println!("{}", report.output.display()),
    }
    Ok(())
}

fn run_extract(args: ExtractArgs, config: &DocConfig) -> Result<(), String> {
    let category = args
        .category
        .as_deref()
        .map(|label| {
            Category::from_label(label).ok_or_else(|| {
                let known: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
                format!(
                    "Unknown category '{label}' (expected one of: {})",
                    known.join(", ")
                )
            })
        })
        .transpose()?;

    let loaded = Pipeline::new(&args.package)
        .load()
        .map_err(|err| failure_message(&err, &config.logging))?;

    let results = match category {
        Some(category) => vec![extract_category(category, &loaded.layout, &loaded.model)],
        None => loaded.extract(),
    };
    print!("{}", format_results(&results, args.format.into())?);
    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<(), String> {
    let output = convert_pbix_to_pbit(&args.input)
        .map_err(|err| format!("Failed to convert '{}': {err}", args.input.display()))?;
    tracing::info!(path = %output.display(), "template written");
    println!("{}", output.display());
    Ok(())
}

fn failure_message(err: &PipelineError, logging: &LoggingConfig) -> String {
    format!(
        "{err} [{}]; see {} for details",
        err.code(),
        logging.file.display()
    )
}
