//! Atomic artifact writes
//!
//! Every output artifact of a pipeline run (GeoJSON, stats document, CSV
//! export) is written through [`write_atomic`] so that a failed run never
//! leaves a truncated file that looks like a successful one. The write goes
//! to a temporary file in the destination directory and is renamed into
//! place only once fully flushed.

use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `contents` to `path` atomically.
///
/// The parent directory is created if missing. The temporary file lives in
/// the same directory as the destination so the final rename stays on one
/// filesystem.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats.json");

        write_atomic(&path, b"{\"ok\":true}").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"{\"ok\":true}");
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.geojson");

        write_atomic(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_write_atomic_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/out.csv");

        write_atomic(&path, b"a,b\n").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_no_stray_temp_files_after_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiles.txt");

        write_atomic(&path, b"data").unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
