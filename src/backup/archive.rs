//! Single-entry archive writing.

use std::fs::File;
use std::io;
use std::path::Path;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::{ArchiveStep, Error, Result};

/// Writes one source file into a fresh archive.
pub trait ArchiveWriter: Send + Sync + 'static {
    /// Whether this writer can produce archives in the current build.
    fn is_available(&self) -> bool;

    /// Creates `dest` containing `source` stored as `entry_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Archive`] naming the failed step.
    fn write_single_entry(&self, source: &Path, entry_name: &str, dest: &Path) -> Result<()>;
}

/// Deflate-compressed ZIP archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveWriter;

impl ArchiveWriter for ZipArchiveWriter {
    fn is_available(&self) -> bool {
        true
    }

    fn write_single_entry(&self, source: &Path, entry_name: &str, dest: &Path) -> Result<()> {
        let out = File::create(dest).map_err(|e| Error::archive(ArchiveStep::Create, e))?;
        let mut zip = ZipWriter::new(out);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        let add_entry = |zip: &mut ZipWriter<File>| -> std::result::Result<(), String> {
            let mut input = File::open(source).map_err(|e| e.to_string())?;
            zip.start_file(entry_name, options).map_err(|e| e.to_string())?;
            io::copy(&mut input, zip).map_err(|e| e.to_string())?;
            Ok(())
        };

        if let Err(reason) = add_entry(&mut zip) {
            drop(zip);
            let _ = std::fs::remove_file(dest);
            return Err(Error::archive(ArchiveStep::AddEntry, reason));
        }

        if let Err(e) = zip.finish() {
            let _ = std::fs::remove_file(dest);
            return Err(Error::archive(ArchiveStep::Finish, e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_single_entry_round_trip() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("data.json");
        std::fs::write(&source, br#"{"comments":[]}"#).unwrap();
        let dest = dir.path().join("data.zip");

        ZipArchiveWriter
            .write_single_entry(&source, "data.json", &dest)
            .unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "data.json");
        let mut body = String::new();
        entry.read_to_string(&mut body).unwrap();
        assert_eq!(body, r#"{"comments":[]}"#);
    }

    #[test]
    fn test_missing_source_fails_at_add_entry() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.zip");
        let err = ZipArchiveWriter
            .write_single_entry(&dir.path().join("absent.json"), "absent.json", &dest)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Archive {
                step: ArchiveStep::AddEntry,
                ..
            }
        ));
        assert!(!dest.exists());
    }

    #[test]
    fn test_unwritable_destination_fails_at_create() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("data.json");
        std::fs::write(&source, b"{}").unwrap();
        let err = ZipArchiveWriter
            .write_single_entry(&source, "data.json", &dir.path().join("no/such/dir/x.zip"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Archive {
                step: ArchiveStep::Create,
                ..
            }
        ));
    }
}
