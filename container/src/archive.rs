//! Zip view over a report package.
//!
//! Report packages (`.pbit`, `.pbix`) are zip files under another extension.
//! Rather than copying what can be a very large file, the package is renamed
//! to its `.zip` name for the duration of the read and renamed back
//! afterwards. The two states are modelled explicitly:
//!
//! - [`PackagedReport`]: the package under its original name.
//! - [`ArchiveView`]: the package under its archive name, obtained from
//!   [`PackagedReport::open`] and turned back with [`ArchiveView::close`].
//!   Dropping an unclosed view still renames the package back.
//!
//! # Examples
//!
//! ```no_run
//! use pbi_doc_container::{LAYOUT_ENTRY, MODEL_ENTRY, PackagedReport};
//!
//! let package = PackagedReport::new("reports/Sales.pbit");
//! let view = package.open().unwrap();
//! let paths = view
//!     .extract_entries("work/", &[LAYOUT_ENTRY, MODEL_ENTRY])
//!     .unwrap();
//! // ... read the extracted payloads ...
//! let package = view.close().unwrap();
//! assert!(package.path().exists());
//! # let _ = paths;
//! ```

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{ContainerError, Result};

/// Entry holding the report layout payload.
pub const LAYOUT_ENTRY: &str = "Report/Layout";

/// Entry holding the data model payload.
pub const MODEL_ENTRY: &str = "DataModelSchema";

/// Extension the package is viewed under while being read.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Returns the archive-name counterpart of a package path
/// (`reports/Sales.pbit` → `reports/Sales.zip`).
pub fn archive_path_for(original: &Path) -> PathBuf {
    original.with_extension(ARCHIVE_EXTENSION)
}

/// Makes the package available under `archive_path`.
///
/// Returns `true` if this call renamed `original_path`, `false` if the
/// archive was already in place. An existing `archive_path` is only taken
/// as already prepared when `original_path` is gone (a run interrupted
/// before it could rename back); when both exist they are different files
/// and neither is touched. Otherwise `original_path` is renamed (not
/// copied) to `archive_path`.
///
/// # Errors
///
/// Returns [`ContainerError::NotFound`] if neither path exists,
/// [`ContainerError::ArchiveConflict`] if both exist, or
/// [`ContainerError::PermissionDenied`] if the rename is refused.
pub fn ensure_archive_form(original_path: &Path, archive_path: &Path) -> Result<bool> {
    if archive_path == original_path {
        if !original_path.exists() {
            return Err(ContainerError::NotFound {
                path: original_path.to_path_buf(),
            });
        }
        return Ok(false);
    }
    if archive_path.exists() {
        if original_path.exists() {
            return Err(ContainerError::ArchiveConflict {
                archive: archive_path.to_path_buf(),
                original: original_path.to_path_buf(),
            });
        }
        info!(archive = %archive_path.display(), "archive already present");
        return Ok(false);
    }
    if !original_path.exists() {
        return Err(ContainerError::NotFound {
            path: original_path.to_path_buf(),
        });
    }
    rename(original_path, archive_path)?;
    info!(
        from = %original_path.display(),
        to = %archive_path.display(),
        "package renamed to archive form"
    );
    Ok(true)
}

/// Renames the archive back to the package's original name.
///
/// A no-op when both names coincide (the package already was a `.zip`).
///
/// # Errors
///
/// Returns [`ContainerError::ArchiveConflict`] if a file already exists at
/// `original_path`; it is never overwritten.
pub fn revert_to_original(archive_path: &Path, original_path: &Path) -> Result<()> {
    if archive_path == original_path {
        return Ok(());
    }
    if original_path.exists() {
        return Err(ContainerError::ArchiveConflict {
            archive: archive_path.to_path_buf(),
            original: original_path.to_path_buf(),
        });
    }
    rename(archive_path, original_path)?;
    info!(
        from = %archive_path.display(),
        to = %original_path.display(),
        "archive reverted to package form"
    );
    Ok(())
}

/// Extracts the named entries of `archive_path` into `destination_dir`.
///
/// Every entry is verified before anything is written, so a missing entry
/// leaves the destination untouched. Entries keep their relative path
/// (`Report/Layout` lands in `destination_dir/Report/Layout`). Returns the
/// extracted file paths in request order.
///
/// # Errors
///
/// - [`ContainerError::NotFound`] if the archive does not exist.
/// - [`ContainerError::CorruptArchive`] if it is not a valid zip, or an entry
///   name would escape the destination.
/// - [`ContainerError::MissingEntry`] naming the first absent entry.
pub fn extract_entries(
    archive_path: &Path,
    destination_dir: &Path,
    entry_names: &[&str],
) -> Result<Vec<PathBuf>> {
    let file = File::open(archive_path).map_err(|e| ContainerError::from_io(e, archive_path))?;
    let mut archive = ZipArchive::new(file).map_err(|e| corrupt(archive_path, e))?;

    for name in entry_names {
        if !archive.file_names().any(|entry| entry == *name) {
            return Err(ContainerError::MissingEntry {
                entry: (*name).to_string(),
            });
        }
    }

    let mut extracted = Vec::with_capacity(entry_names.len());
    for name in entry_names {
        let mut entry = archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => ContainerError::MissingEntry {
                entry: (*name).to_string(),
            },
            other => corrupt(archive_path, other),
        })?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ContainerError::CorruptArchive {
                path: archive_path.to_path_buf(),
                reason: format!("entry '{name}' escapes the extraction directory"),
            })?;
        let target = destination_dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        debug!(entry = name, target = %target.display(), "entry extracted");
        extracted.push(target);
    }

    info!(
        count = extracted.len(),
        destination = %destination_dir.display(),
        "entries extracted"
    );
    Ok(extracted)
}

/// A report package under its original name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedReport {
    path: PathBuf,
}

impl PackagedReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The package path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The package's base name, used as the report name
    /// (`reports/Sales.pbit` → `Sales`).
    pub fn report_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Where the package lives while it is viewed as an archive.
    pub fn archive_path(&self) -> PathBuf {
        archive_path_for(&self.path)
    }

    /// Renames the package to its archive name.
    ///
    /// # Errors
    ///
    /// See [`ensure_archive_form`].
    pub fn open(self) -> Result<ArchiveView> {
        let archive = self.archive_path();
        let renamed = ensure_archive_form(&self.path, &archive)?;
        Ok(ArchiveView {
            archive,
            original: self.path,
            renamed,
            open: true,
        })
    }
}

/// A report package temporarily renamed to its archive name.
///
/// Call [`close`](Self::close) once the payloads are in memory. If the view
/// is dropped without being closed (an early return on an error path), the
/// rename is reverted on drop and the outcome logged.
#[derive(Debug)]
pub struct ArchiveView {
    archive: PathBuf,
    original: PathBuf,
    renamed: bool,
    open: bool,
}

impl ArchiveView {
    /// Current (archive) path of the package.
    pub fn archive_path(&self) -> &Path {
        &self.archive
    }

    /// Path the package is restored to on close.
    pub fn original_path(&self) -> &Path {
        &self.original
    }

    /// Whether [`PackagedReport::open`] renamed the package itself, as
    /// opposed to finding it already under its archive name.
    pub fn renamed(&self) -> bool {
        self.renamed
    }

    /// Extracts entries from the viewed archive. See [`extract_entries`].
    pub fn extract_entries(
        &self,
        destination_dir: impl AsRef<Path>,
        entry_names: &[&str],
    ) -> Result<Vec<PathBuf>> {
        extract_entries(&self.archive, destination_dir.as_ref(), entry_names)
    }

    /// Renames the archive back to the original package name.
    ///
    /// The revert is attempted exactly once: on failure the error is returned
    /// and the drop handler does not retry.
    pub fn close(mut self) -> Result<PackagedReport> {
        self.open = false;
        debug!(renamed = self.renamed, archive = %self.archive.display(), "closing archive view");
        revert_to_original(&self.archive, &self.original)?;
        Ok(PackagedReport::new(self.original.clone()))
    }
}

impl Drop for ArchiveView {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        match revert_to_original(&self.archive, &self.original) {
            Ok(()) => warn!(
                package = %self.original.display(),
                "archive view dropped without close; package restored"
            ),
            Err(err) => error!(
                archive = %self.archive.display(),
                package = %self.original.display(),
                %err,
                "failed to restore package after interrupted run"
            ),
        }
    }
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| ContainerError::from_io(e, from))
}

fn corrupt(path: &Path, err: ZipError) -> ContainerError {
    match err {
        ZipError::Io(io_err) => ContainerError::from_io(io_err, path),
        other => ContainerError::CorruptArchive {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}
