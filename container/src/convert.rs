//! `.pbix` → `.pbit` conversion.
//!
//! A `.pbix` report carries its imported data under `Data/`; a `.pbit`
//! template is the same package without that cache. Conversion copies every
//! other entry into a new deflate-compressed archive next to the source.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{ContainerError, Result};

/// Entry prefix of the imported data cache.
pub const DATA_PREFIX: &str = "Data/";

/// Writes `<stem>.pbit` next to `pbix_path`, dropping the data cache.
///
/// The source file is left untouched; an existing `.pbit` of the same name is
/// replaced. Returns the path of the written template.
///
/// # Errors
///
/// - [`ContainerError::NotFound`] if `pbix_path` does not exist.
/// - [`ContainerError::InvalidInput`] if it does not have a `.pbix` extension.
/// - [`ContainerError::CorruptArchive`] if it is not a readable zip.
pub fn convert_pbix_to_pbit(pbix_path: &Path) -> Result<PathBuf> {
    if !pbix_path.exists() {
        return Err(ContainerError::NotFound {
            path: pbix_path.to_path_buf(),
        });
    }
    let is_pbix = pbix_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pbix"));
    if !is_pbix {
        return Err(ContainerError::InvalidInput(format!(
            "'{}' must have the .pbix extension",
            pbix_path.display()
        )));
    }

    let source = File::open(pbix_path).map_err(|e| ContainerError::from_io(e, pbix_path))?;
    let mut archive = ZipArchive::new(source).map_err(|e| ContainerError::CorruptArchive {
        path: pbix_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let target = pbix_path.with_extension("pbit");
    let directory = match pbix_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(directory)?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(staged.as_file_mut());
    let mut copied = 0usize;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() || entry.name().starts_with(DATA_PREFIX) {
            debug!(entry = entry.name(), "skipping entry");
            continue;
        }
        let name = entry.name().to_string();
        writer.start_file(name, options)?;
        io::copy(&mut entry, &mut writer)?;
        copied += 1;
    }
    writer.finish()?;

    staged.persist(&target).map_err(|e| e.error)?;
    info!(
        source = %pbix_path.display(),
        target = %target.display(),
        entries = copied,
        "converted report to template"
    );
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn write_pbix(path: &Path) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in [
            ("Version", "1.28"),
            ("Report/Layout", "{}"),
            ("DataModelSchema", "{}"),
            ("Data/Model", "binary cache"),
        ] {
            writer
                .start_file(name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_convert_drops_data_cache() {
        let dir = tempfile::tempdir().unwrap();
        let pbix = dir.path().join("Sales.pbix");
        write_pbix(&pbix);
        let before = std::fs::read(&pbix).unwrap();

        let pbit = convert_pbix_to_pbit(&pbix).unwrap();
        assert_eq!(pbit, dir.path().join("Sales.pbit"));
        assert_eq!(std::fs::read(&pbix).unwrap(), before);

        let mut archive = ZipArchive::new(File::open(&pbit).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(String::from).collect();
        names.sort();
        assert_eq!(names, vec!["DataModelSchema", "Report/Layout", "Version"]);

        let mut version = String::new();
        archive
            .by_name("Version")
            .unwrap()
            .read_to_string(&mut version)
            .unwrap();
        assert_eq!(version, "1.28");
    }

    #[test]
    fn test_convert_rejects_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sales.pbit");
        std::fs::write(&path, b"x").unwrap();

        let err = convert_pbix_to_pbit(&path).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidInput(_)));
    }

    #[test]
    fn test_convert_accepts_uppercase_extension() {
        let dir = tempfile::tempdir().unwrap();
        let pbix = dir.path().join("Sales.PBIX");
        write_pbix(&pbix);
        assert!(convert_pbix_to_pbit(&pbix).unwrap().exists());
    }

    #[test]
    fn test_convert_missing_file() {
        let err = convert_pbix_to_pbit(Path::new("/nonexistent/Sales.pbix")).unwrap_err();
        assert!(matches!(err, ContainerError::NotFound { .. }));
    }
}
