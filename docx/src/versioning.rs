//! Collision-free output file names.

use std::path::{Path, PathBuf};

/// Marker inserted between the file stem and the version number.
pub const VERSION_MARKER: &str = "_versão_";

/// First version number used when the requested path is taken.
pub const FIRST_VERSION: u32 = 2;

/// Returns `path` if it is free, otherwise the first free versioned sibling.
///
/// Versioned names have the form `<stem>_versão_NN<ext>` with `NN` zero
/// padded to two digits, counting up from 2.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use pbi_doc_docx::resolve_output_path;
///
/// // With out/Sales_documentado.docx already present:
/// let path = resolve_output_path(Path::new("out/Sales_documentado.docx"));
/// assert_eq!(path, Path::new("out/Sales_documentado_versão_02.docx"));
/// ```
pub fn resolve_output_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let mut version = FIRST_VERSION;
    loop {
        let candidate = versioned_path(path, version);
        if !candidate.exists() {
            return candidate;
        }
        version += 1;
    }
}

/// Builds the `version`-th sibling name of `path` without touching the disk.
pub fn versioned_path(path: &Path, version: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{VERSION_MARKER}{version:02}{extension}"))
}
