//! Writing documents to disk.

use std::{
    fs,
    io::{self, Write as _},
    path::{self, Path, PathBuf},
};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::MxguardError;

/// Extension given to output paths that have none.
pub const DOCUMENT_EXTENSION: &str = "drawio";

/// Writes `text` verbatim to `path` and returns the absolute path written.
///
/// A path without an extension gets [`DOCUMENT_EXTENSION`]. Missing parent
/// directories are created. The text goes to a temporary file next to the
/// target first, so a failed write never leaves a truncated document.
///
/// # Errors
///
/// Returns [`MxguardError::Io`] if the path has no file name or any
/// filesystem operation fails.
pub fn write_document(text: &str, path: impl AsRef<Path>) -> Result<PathBuf, MxguardError> {
    let mut target = path.as_ref().to_path_buf();
    if target.file_name().is_none() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid output path: {}", target.display()),
        )
        .into());
    }
    if target.extension().is_none() {
        target.set_extension(DOCUMENT_EXTENSION);
    }

    let target = path::absolute(&target)?;
    let parent = target.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path has no parent directory: {}", target.display()),
        )
    })?;
    fs::create_dir_all(parent)?;
    debug!(dir:? = parent; "Output directory ready");

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(text.as_bytes())?;
    file.persist(&target).map_err(|err| err.error)?;

    info!(path:? = target, bytes = text.len(); "Document written");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_extension() {
        let dir = tempfile::tempdir().expect("temp dir");

        let written = write_document("<mxfile/>", dir.path().join("diagram")).expect("write");

        assert_eq!(written, dir.path().join("diagram.drawio"));
        assert_eq!(fs::read_to_string(&written).expect("read"), "<mxfile/>");
    }

    #[test]
    fn test_keeps_existing_extension() {
        let dir = tempfile::tempdir().expect("temp dir");

        let written = write_document("<mxfile/>", dir.path().join("diagram.xml")).expect("write");

        assert_eq!(written, dir.path().join("diagram.xml"));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("out").join("nested").join("arch.drawio");

        let written = write_document("text", &target).expect("write");

        assert_eq!(written, target);
        assert!(written.is_file());
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("arch.drawio");
        fs::write(&target, "old contents that are longer").expect("seed");

        write_document("new", &target).expect("write");

        assert_eq!(fs::read_to_string(&target).expect("read"), "new");
    }

    #[test]
    fn test_returns_absolute_path() {
        let dir = tempfile::tempdir().expect("temp dir");

        let written = write_document("x", dir.path().join("a")).expect("write");

        assert!(written.is_absolute());
    }

    #[test]
    fn test_rejects_path_without_file_name() {
        let err = write_document("x", "..").expect_err("no file name");

        assert!(matches!(err, MxguardError::Io(_)));
    }
}
