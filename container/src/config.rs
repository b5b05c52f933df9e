//! Documentation run configuration.
//!
//! Defines the YAML-serializable settings shared by the command-line front
//! end: default template and output locations plus logging options. Every
//! field is optional in the file; omitted fields take their defaults.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! template: templates/modelo.docx
//! output_dir: output
//! logging:
//!   file: power_bi_doc.log
//!   level: info
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ContainerError, Result};

/// Default log file name, written in the working directory.
pub const DEFAULT_LOG_FILE: &str = "power_bi_doc.log";

/// Default log level filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where and how verbosely a run logs.
///
/// # Examples
///
/// ```
/// # use pbi_doc_container::LoggingConfig;
/// let logging = LoggingConfig::default();
/// assert_eq!(logging.file.to_str(), Some("power_bi_doc.log"));
/// assert_eq!(logging.level, "info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file path; relative paths resolve against the working directory.
    pub file: PathBuf,
    /// `tracing` filter directive (e.g. `info`, `pbi_doc_docx=debug`).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Top-level configuration for documentation runs.
///
/// # Examples
///
/// ```no_run
/// use pbi_doc_container::DocConfig;
///
/// let config = DocConfig::load("pbi-doc.yml").unwrap();
/// if let Some(template) = &config.template {
///     println!("default template: {}", template.display());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Template used when none is given on the command line.
    pub template: Option<PathBuf>,
    /// Output directory used when none is given on the command line.
    pub output_dir: Option<PathBuf>,
    pub logging: LoggingConfig,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            template: None,
            output_dir: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl DocConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`](crate::ContainerError::NotFound) if the file does
    /// not exist, [`IoError`](crate::ContainerError::IoError) if it cannot be
    /// read, or [`YamlError`](crate::ContainerError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| ContainerError::from_io(e, path))?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ContainerError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::ContainerError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Resolves the template to use, preferring an explicit path.
    pub fn template_or<'a>(&'a self, explicit: Option<&'a Path>) -> Option<&'a Path> {
        explicit.or(self.template.as_deref())
    }

    /// Resolves the output directory, preferring an explicit path and
    /// defaulting to the current directory.
    pub fn output_dir_or(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
template: templates/modelo.docx
output_dir: docs
logging:
  file: logs/run.log
  level: debug
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: DocConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.template, Some(PathBuf::from("templates/modelo.docx")));
        assert_eq!(config.output_dir, Some(PathBuf::from("docs")));
        assert_eq!(config.logging.file, PathBuf::from("logs/run.log"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_deserialize_minimal_uses_defaults() {
        let config: DocConfig = serde_yaml::from_str("version: \"1.0\"\n").unwrap();
        assert_eq!(config, DocConfig::default());
        assert_eq!(config.logging.file, PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_partial_logging_section() {
        let config: DocConfig = serde_yaml::from_str("logging:\n  level: warn\n").unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_explicit_paths_override_config() {
        let config: DocConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        let explicit = Path::new("other.docx");
        assert_eq!(config.template_or(Some(explicit)), Some(explicit));
        assert_eq!(
            config.template_or(None),
            Some(Path::new("templates/modelo.docx"))
        );
        assert_eq!(config.output_dir_or(Some(Path::new("out"))), PathBuf::from("out"));
        assert_eq!(config.output_dir_or(None), PathBuf::from("docs"));
        assert_eq!(DocConfig::default().output_dir_or(None), PathBuf::from("."));
    }

    #[test]
    fn test_load_missing_file() {
        let err = DocConfig::load("/nonexistent/pbi-doc.yml").unwrap_err();
        assert!(matches!(err, ContainerError::NotFound { .. }));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pbi-doc.yml");

        let original: DocConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = DocConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
